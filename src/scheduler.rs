//! 延时任务队列
//!
//! 用显式时钟（自启动以来的 `Duration`）驱动，便于测试；
//! 每个任务都有取消句柄，并按通道（lane）分组批量取消。

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// 任务句柄，用于取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// 任务通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Stagger,     // 逐张翻牌
    AutoConceal, // 开局预览结束后的自动盖牌
    Resolution,  // 不匹配后的翻回
}

#[derive(Debug, Clone)]
struct Task<A> {
    lane: Lane,
    action: A,
}

/// 延时任务队列
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    now: Duration,
    next_id: u64,
    // (到期时间, 序号) 保证同一时刻按安排顺序触发
    tasks: BTreeMap<(Duration, u64), Task<A>>,
    // 序号 -> 到期时间
    due_by_id: HashMap<u64, Duration>,
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            tasks: BTreeMap::new(),
            due_by_id: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 安排一个在 `delay` 之后触发的任务
    pub fn schedule(&mut self, delay: Duration, lane: Lane, action: A) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now + delay;
        self.tasks.insert((due, id), Task { lane, action });
        self.due_by_id.insert(id, due);
        TaskHandle(id)
    }

    /// 取消任务，返回任务是否仍在等待
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.due_by_id.remove(&handle.0) {
            Some(due) => self.tasks.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    /// 取消某通道的全部任务，返回取消的数量
    pub fn cancel_lane(&mut self, lane: Lane) -> usize {
        let due_by_id = &mut self.due_by_id;
        let before = self.tasks.len();
        self.tasks.retain(|(_, id), task| {
            let keep = task.lane != lane;
            if !keep {
                due_by_id.remove(id);
            }
            keep
        });
        before - self.tasks.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        self.due_by_id.clear();
        count
    }

    #[cfg(test)]
    pub fn pending_in(&self, lane: Lane) -> usize {
        self.tasks.values().filter(|t| t.lane == lane).count()
    }

    /// 取出下一个在 `until` 之前到期的任务，并把时钟拨到它的到期时间；
    /// 没有到期任务时时钟前进到 `until`
    pub fn next_due(&mut self, until: Duration) -> Option<A> {
        let Some(&key) = self.tasks.keys().next() else {
            self.now = self.now.max(until);
            return None;
        };
        if key.0 > until {
            self.now = self.now.max(until);
            return None;
        }
        self.now = self.now.max(key.0);
        self.due_by_id.remove(&key.1);
        self.tasks.remove(&key).map(|task| task.action)
    }

    /// 时钟前进到 `until`（不执行任务）
    #[cfg(test)]
    pub fn advance(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(scheduler: &mut Scheduler<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(action) = scheduler.next_due(until) {
            fired.push(action);
        }
        fired
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(300), Lane::Stagger, "c");
        scheduler.schedule(ms(100), Lane::Stagger, "a");
        scheduler.schedule(ms(200), Lane::Resolution, "b");

        assert_eq!(drain(&mut scheduler, ms(150)), vec!["a"]);
        assert_eq!(scheduler.now(), ms(150));
        assert_eq!(drain(&mut scheduler, ms(1000)), vec!["b", "c"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_ties_keep_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), Lane::Stagger, "first");
        scheduler.schedule(ms(0), Lane::Stagger, "second");
        scheduler.schedule(ms(0), Lane::Stagger, "third");

        assert_eq!(
            drain(&mut scheduler, Duration::ZERO),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_clock_follows_fired_task() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(100), Lane::AutoConceal, "x");

        assert_eq!(scheduler.next_due(ms(500)), Some("x"));
        // 任务内部继续安排的任务相对于到期时间
        assert_eq!(scheduler.now(), ms(100));
        scheduler.schedule(ms(50), Lane::Stagger, "y");
        assert_eq!(scheduler.next_due(ms(500)), Some("y"));
        assert_eq!(scheduler.now(), ms(150));
        assert_eq!(scheduler.next_due(ms(500)), None);
        assert_eq!(scheduler.now(), ms(500));
    }

    #[test]
    fn test_cancel_handle() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(ms(10), Lane::Stagger, "keep");
        let dropped = scheduler.schedule(ms(10), Lane::Stagger, "dropped");

        assert!(scheduler.cancel(dropped));
        assert!(!scheduler.cancel(dropped));
        assert_eq!(drain(&mut scheduler, ms(10)), vec!["keep"]);
        assert!(!scheduler.cancel(keep));
    }

    #[test]
    fn test_cancel_lane() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(10), Lane::Stagger, "s1");
        scheduler.schedule(ms(20), Lane::Stagger, "s2");
        scheduler.schedule(ms(30), Lane::Resolution, "r");

        assert_eq!(scheduler.pending_in(Lane::Stagger), 2);
        assert_eq!(scheduler.cancel_lane(Lane::Stagger), 2);
        assert_eq!(drain(&mut scheduler, ms(100)), vec!["r"]);
        assert_eq!(scheduler.cancel_all(), 0);
    }

    #[test]
    fn test_cancel_after_lane_or_fire() {
        let mut scheduler = Scheduler::new();
        let handles: Vec<TaskHandle> = (0..100)
            .map(|i| scheduler.schedule(ms(i), Lane::Stagger, "s"))
            .collect();
        let fired = scheduler.schedule(ms(0), Lane::Resolution, "fired");
        let late = scheduler.schedule(ms(500), Lane::Resolution, "late");

        assert!(scheduler.cancel(handles[57]));
        assert_eq!(scheduler.cancel_lane(Lane::Stagger), 99);
        assert!(!scheduler.cancel(handles[10]));
        assert!(!scheduler.cancel(handles[57]));

        assert_eq!(scheduler.next_due(ms(0)), Some("fired"));
        assert!(!scheduler.cancel(fired));
        assert!(scheduler.cancel(late));
        assert_eq!(scheduler.cancel_all(), 0);
        assert!(scheduler.due_by_id.is_empty());
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut scheduler: Scheduler<&'static str> = Scheduler::new();
        scheduler.advance(ms(500));
        scheduler.advance(ms(100));
        assert_eq!(scheduler.now(), ms(500));
        assert_eq!(scheduler.next_due(ms(200)), None);
        assert_eq!(scheduler.now(), ms(500));
    }
}
