//! 后台任务管理：每种周期任务至多一个实例
//!
//! 每个实例由一个 ticker 任务驱动，ticker 只向控制器通道投递带 generation 的 Tick。
//! start 先停掉同类旧实例（abort ticker、移除槽位）再安装新实例；
//! 已经排在通道里的旧 tick 因 generation 不符在 accept 处被丢弃，因此新旧实例不会在同一时刻都生效。

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::adapter::Vec3;
use crate::core::event::ControllerEvent;

/// 任务类型
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TaskKind {
    /// 寻路进度报告
    MovementReporter,
    /// 跟随玩家
    FollowLoop,
    /// 断线重连
    ReconnectScheduler,
}

/// 任务实例及其参数
#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundTask {
    MovementReporter {
        target: Vec3,
        started: Instant,
        initial_distance: f64,
    },
    FollowLoop {
        target: String,
    },
    ReconnectScheduler,
}

impl BackgroundTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            BackgroundTask::MovementReporter { .. } => TaskKind::MovementReporter,
            BackgroundTask::FollowLoop { .. } => TaskKind::FollowLoop,
            BackgroundTask::ReconnectScheduler => TaskKind::ReconnectScheduler,
        }
    }
}

struct Slot {
    generation: u64,
    task: BackgroundTask,
    ticker: JoinHandle<()>,
}

/// 任务管理器（仅由 Controller 持有和修改）
pub struct TaskManager {
    slots: HashMap<TaskKind, Slot>,
    next_generation: u64,
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl TaskManager {
    pub fn new(tx: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self {
            slots: HashMap::new(),
            next_generation: 0,
            tx,
        }
    }

    /// 以固定周期启动任务，第一次 tick 在一个周期之后；返回新实例的 generation
    pub fn start(&mut self, task: BackgroundTask, period: Duration) -> u64 {
        let kind = task.kind();
        self.stop(kind);

        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.tx.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(ControllerEvent::Tick { kind, generation }).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(?kind, generation, ?period, "background task started");
        self.slots.insert(
            kind,
            Slot {
                generation,
                task,
                ticker,
            },
        );
        generation
    }

    /// 停止某类任务，返回被停止的实例
    pub fn stop(&mut self, kind: TaskKind) -> Option<BackgroundTask> {
        self.slots.remove(&kind).map(|slot| {
            slot.ticker.abort();
            tracing::debug!(?kind, generation = slot.generation, "background task stopped");
            slot.task
        })
    }

    /// 停止全部任务，返回停止的数量
    pub fn stop_all(&mut self) -> usize {
        let kinds: Vec<TaskKind> = self.slots.keys().copied().collect();
        kinds.into_iter().filter_map(|k| self.stop(k)).count()
    }

    /// tick 的守卫：只有当前实例的 tick 被接受
    pub fn accept(&self, kind: TaskKind, generation: u64) -> Option<&BackgroundTask> {
        self.slots
            .get(&kind)
            .filter(|slot| slot.generation == generation)
            .map(|slot| &slot.task)
    }

    pub fn get(&self, kind: TaskKind) -> Option<&BackgroundTask> {
        self.slots.get(&kind).map(|slot| &slot.task)
    }

    pub fn generation(&self, kind: TaskKind) -> Option<u64> {
        self.slots.get(&kind).map(|slot| slot.generation)
    }

    pub fn is_active(&self, kind: TaskKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn active_count(&self) -> usize {
        self.slots.len()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        for slot in self.slots.values() {
            slot.ticker.abort();
        }
    }
}
