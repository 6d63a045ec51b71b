//! 处理统计

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 处理器的累计统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStatistics {
    /// 第一次处理开始的时间
    pub started_at: Option<DateTime<Utc>>,
    /// 最近一次处理结束的时间
    pub stopped_at: Option<DateTime<Utc>>,
    /// 已完成的处理次数
    pub pass_count: u64,
    /// 被取消的处理次数
    pub cancelled_count: u64,
    /// 最近一次处理的组件数
    pub component_count: usize,
    /// 最近一次处理的绑定节点数
    pub binding_count: usize,
    /// 最近一次处理的错误数
    pub error_count: usize,
    /// 最近一次处理的警告数
    pub warning_count: usize,
    /// 最近一次处理的耗时
    pub last_elapsed: Duration,
    /// 累计耗时
    pub total_elapsed: Duration,
}

/// 单次处理的摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub component_count: usize,
    pub binding_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub elapsed: Duration,
}

impl ProcessingStatistics {
    /// 记录一次处理开始
    pub fn mark_started(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
    }

    /// 记录一次完成的处理
    pub fn record_pass(&mut self, summary: PassSummary) {
        self.pass_count += 1;
        self.component_count = summary.component_count;
        self.binding_count = summary.binding_count;
        self.error_count = summary.error_count;
        self.warning_count = summary.warning_count;
        self.last_elapsed = summary.elapsed;
        self.total_elapsed += summary.elapsed;
        self.stopped_at = Some(Utc::now());
    }

    /// 记录一次被取消的处理
    pub fn record_cancelled(&mut self) {
        self.cancelled_count += 1;
        self.stopped_at = Some(Utc::now());
    }

    /// 平均每次处理的耗时
    pub fn average_elapsed(&self) -> Duration {
        match u32::try_from(self.pass_count) {
            Ok(count) if count > 0 => self.total_elapsed / count,
            _ => Duration::ZERO,
        }
    }
}
