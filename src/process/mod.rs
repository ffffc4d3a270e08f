//! 进程控制模块
//!
//! 缓存层与物理页分配器不关心进程如何调度，只需要三件事：
//! 当前 hart 的编号、可嵌套的关中断，以及让持有睡眠锁的进程休眠 / 被唤醒。
//! 这些能力由宿主内核在启动时通过 [`init`] 注入。

use spin::Once;

use crate::spinlock::SpinLockGuard;

pub use cpu::{cpu_id, pop_off, push_off, Hart, IntrState};

mod cpu;

pub(crate) use cpu::cpu_id_locked;

/// 进程调度接口，供睡眠锁使用
pub trait Scheduler: Sync {
    /// 当前正在运行的进程号
    fn pid(&self) -> usize;

    /// 在 `chan` 上休眠。
    ///
    /// 实现者必须先取得自己的进程锁再释放 `guard`，
    /// 保证不会错过在释放与休眠之间发出的 `wakeup`。
    /// 允许虚假唤醒，调用者总会在循环中重新检查条件。
    fn sleep(&self, chan: usize, guard: SpinLockGuard<'_, ()>);

    /// 唤醒所有在 `chan` 上休眠的进程
    fn wakeup(&self, chan: usize);
}

static SCHED: Once<&'static dyn Scheduler> = Once::new();

/// 注入宿主内核的 hart 操作与调度器。
///
/// 必须在启动时、任何锁被使用之前调用且只调用一次。
pub fn init(hart: &'static dyn Hart, sched: &'static dyn Scheduler) {
    cpu::install(hart);
    SCHED.call_once(|| sched);
    log::info!("process: hart and scheduler installed");
}

pub(crate) fn sched() -> &'static dyn Scheduler {
    match SCHED.get() {
        Some(sched) => *sched,
        None => panic!("sched: used before init"),
    }
}
