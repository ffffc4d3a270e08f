//! 测试用的宿主平台：每个 std 线程扮演一个 hart 上运行的进程

use std::boxed::Box;
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use std::thread;

use crate::process::{self, Hart, IntrState, Scheduler};
use crate::spinlock::SpinLockGuard;

/// 未绑定的线程从这里开始分配 hart 号，保证与 `on_hart` 绑定的编号不冲突
const UNPINNED_BASE: usize = 1 << 16;

static NEXT_HART: AtomicUsize = AtomicUsize::new(UNPINNED_BASE);
static NEXT_PID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static HART_ID: Cell<Option<usize>> = const { Cell::new(None) };
    static PID: Cell<usize> = const { Cell::new(0) };
    static INTR: Cell<bool> = const { Cell::new(true) };
    static STATE: &'static IntrState = Box::leak(Box::new(IntrState::new()));
}

struct HostHart;

impl Hart for HostHart {
    fn id(&self) -> usize {
        HART_ID.with(|h| match h.get() {
            Some(id) => id,
            None => {
                let id = NEXT_HART.fetch_add(1, Ordering::Relaxed);
                h.set(Some(id));
                id
            }
        })
    }

    fn intr_get(&self) -> bool {
        INTR.with(|c| c.get())
    }

    fn intr_on(&self) {
        INTR.with(|c| c.set(true));
    }

    fn intr_off(&self) {
        INTR.with(|c| c.set(false));
    }

    fn intr_state(&self) -> &IntrState {
        STATE.with(|s| *s)
    }
}

struct HostSched;

impl Scheduler for HostSched {
    fn pid(&self) -> usize {
        PID.with(|p| {
            if p.get() == 0 {
                p.set(NEXT_PID.fetch_add(1, Ordering::Relaxed));
            }
            p.get()
        })
    }

    fn sleep(&self, _chan: usize, guard: SpinLockGuard<'_, ()>) {
        drop(guard);
        thread::yield_now();
    }

    fn wakeup(&self, _chan: usize) {}
}

static HOST_HART: HostHart = HostHart;
static HOST_SCHED: HostSched = HostSched;

/// 宿主平台的 hart 操作
pub fn host_hart() -> &'static dyn Hart {
    &HOST_HART
}

pub fn setup() {
    static INIT: Once = Once::new();
    INIT.call_once(|| process::init(&HOST_HART, &HOST_SCHED));
}

/// 把当前线程绑定到编号为 `id` 的 hart。
/// 同一时刻参与同一把锁竞争的线程必须绑定不同的编号。
pub fn on_hart(id: usize) {
    setup();
    HART_ID.with(|h| h.set(Some(id)));
}

pub fn intr_enabled() -> bool {
    INTR.with(|c| c.get())
}

pub fn set_intr(on: bool) {
    INTR.with(|c| c.set(on));
}
