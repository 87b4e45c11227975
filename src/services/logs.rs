//! Event log service.

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256},
};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    etherscan::{network_name, ChainRequest, ExplorerApi},
    types::{EventLogs, LogEntry, RawLog},
};

/// Default number of log entries returned.
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Maximum number of log entries returned (the explorer's page ceiling).
pub const MAX_LOG_LIMIT: usize = 1000;

/// Entries per `logs/getLogs` page; a full page means more may follow.
const LOG_PAGE_SIZE: usize = 1000;

/// Maximum pages read for one query before giving up.
const MAX_LOG_PAGES: usize = 100;

/// Maximum number of topic positions.
pub const MAX_TOPICS: usize = 4;

/// How adjacent topic filters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicOperator {
    #[default]
    And,
    Or,
}

impl TopicOperator {
    fn as_str(self) -> &'static str {
        match self {
            TopicOperator::And => "and",
            TopicOperator::Or => "or",
        }
    }
}

impl std::str::FromStr for TopicOperator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "and" => Ok(TopicOperator::And),
            "or" => Ok(TopicOperator::Or),
            _ => Err(AppError::SchemaValidation(format!(
                "Invalid topic operator '{}': expected 'and' or 'or'",
                s
            ))),
        }
    }
}

/// Validated log filter.
#[derive(Debug, Clone)]
pub struct LogFilter {
    pub address: Option<Address>,
    pub from_block: BlockNumberOrTag,
    pub to_block: BlockNumberOrTag,
    /// Topic per position; `None` is a wildcard.
    pub topics: Vec<Option<B256>>,
    pub operator: TopicOperator,
    pub limit: usize,
}

impl LogFilter {
    /// Check the filter is something the explorer can answer.
    pub fn validate(&self) -> Result<()> {
        if self.address.is_none() && self.topics.iter().all(Option::is_none) {
            return Err(AppError::SchemaValidation(
                "An address or at least one topic is required".into(),
            ));
        }
        if self.topics.len() > MAX_TOPICS {
            return Err(AppError::SchemaValidation(format!(
                "At most {} topics allowed, got {}",
                MAX_TOPICS,
                self.topics.len()
            )));
        }
        if self.limit == 0 || self.limit > MAX_LOG_LIMIT {
            return Err(AppError::SchemaValidation(format!(
                "limit must be between 1 and {}",
                MAX_LOG_LIMIT
            )));
        }
        logs_block_param(self.from_block)?;
        logs_block_param(self.to_block)?;
        Ok(())
    }

    /// Build the request for the page starting at `from_block`.
    fn to_request(&self, chain_id: u64, from_block: BlockNumberOrTag) -> Result<ChainRequest> {
        let mut request = ChainRequest::new(chain_id, "logs", "getLogs")
            .param("fromBlock", logs_block_param(from_block)?)
            .param("toBlock", logs_block_param(self.to_block)?)
            .param("page", "1")
            .param("offset", LOG_PAGE_SIZE.to_string());

        if let Some(address) = self.address {
            request = request.param("address", address.to_string());
        }

        let present: Vec<(usize, B256)> = self
            .topics
            .iter()
            .enumerate()
            .filter_map(|(i, topic)| topic.map(|t| (i, t)))
            .collect();

        for (i, topic) in &present {
            request = request.param(format!("topic{}", i), topic.to_string());
        }
        for pair in present.windows(2) {
            let (a, b) = (pair[0].0, pair[1].0);
            request = request.param(format!("topic{}_{}_opr", a, b), self.operator.as_str());
        }

        Ok(request)
    }
}

/// `logs/getLogs` takes decimal block numbers or `latest`.
fn logs_block_param(tag: BlockNumberOrTag) -> Result<String> {
    match tag {
        BlockNumberOrTag::Number(n) => Ok(n.to_string()),
        BlockNumberOrTag::Latest => Ok("latest".to_string()),
        BlockNumberOrTag::Earliest => Ok("0".to_string()),
        other => Err(AppError::SchemaValidation(format!(
            "Block tag '{}' is not supported for log queries",
            other
        ))),
    }
}

/// Service for event log queries.
#[derive(Clone)]
pub struct LogService {
    api: Arc<dyn ExplorerApi>,
}

impl LogService {
    /// Create a new log service.
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self { api }
    }

    /// Get matching logs, most recent first, truncated to the filter's limit.
    ///
    /// The explorer returns logs oldest first, one page at a time. While a
    /// page comes back full, the next request restarts at the last block seen
    /// so the newest logs are always reached.
    pub async fn get_event_logs(&self, chain_id: u64, filter: &LogFilter) -> Result<EventLogs> {
        filter.validate()?;

        let mut logs: Vec<LogEntry> = Vec::new();
        let mut from_block = filter.from_block;
        let mut complete = false;

        for page in 1..=MAX_LOG_PAGES {
            let request = filter.to_request(chain_id, from_block)?;
            tracing::debug!(chain_id, page, params = ?request.params, "Querying event logs");

            let batch = self.fetch_page(request).await?;
            if batch.len() < LOG_PAGE_SIZE {
                logs.extend(batch);
                complete = true;
                break;
            }

            let last_block = batch.iter().filter_map(|l| l.block_number).max().ok_or_else(|| {
                AppError::Decoding("Log page without block numbers".to_string())
            })?;
            logs.extend(batch);

            let next = if Some(last_block) == block_number(from_block) {
                tracing::warn!(chain_id, block = last_block, "Block holds a full page of logs");
                last_block + 1
            } else {
                last_block
            };
            if matches!(filter.to_block, BlockNumberOrTag::Number(end) if next > end) {
                complete = true;
                break;
            }

            // The last block may be split across pages; the next page returns it in full.
            logs.retain(|l| l.block_number != Some(next));
            from_block = BlockNumberOrTag::Number(next);
        }

        if !complete {
            return Err(AppError::UpstreamRejected(format!(
                "More than {} matching logs; narrow the block range",
                MAX_LOG_PAGES * LOG_PAGE_SIZE
            )));
        }

        sort_most_recent_first(&mut logs);
        logs.truncate(filter.limit);

        Ok(EventLogs { network: network_name(chain_id), count: logs.len(), logs })
    }

    async fn fetch_page(&self, request: ChainRequest) -> Result<Vec<LogEntry>> {
        let result = self.api.call(request).await?;
        let raw: Vec<RawLog> = match result {
            Value::Array(_) => serde_json::from_value(result)
                .map_err(|e| AppError::Decoding(format!("Unexpected log entry: {}", e)))?,
            Value::Null => Vec::new(),
            other => return Err(AppError::Decoding(format!("Unexpected logs result: {}", other))),
        };
        raw.into_iter().map(LogEntry::from_raw).collect()
    }
}

fn block_number(tag: BlockNumberOrTag) -> Option<u64> {
    match tag {
        BlockNumberOrTag::Number(n) => Some(n),
        BlockNumberOrTag::Earliest => Some(0),
        _ => None,
    }
}

fn sort_most_recent_first(logs: &mut [LogEntry]) {
    logs.sort_by(|a, b| {
        (b.block_number, b.log_index).cmp(&(a.block_number, a.log_index))
    });
}
