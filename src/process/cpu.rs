//! 处理器状态管理：当前 hart 的标识与中断开关的嵌套

use core::cell::Cell;

use spin::Once;

/// 内核为每个 hart 提供的底层操作。
///
/// 实现者通常读取 `tp` 寄存器得到 hart 号，并通过 `sstatus.SIE` 开关中断。
/// 本 crate 只通过 [`push_off`] / [`pop_off`] / [`cpu_id`] 间接使用它。
pub trait Hart: Sync {
    /// 当前 hart 的编号。
    ///
    /// 必须在关中断的情况下调用，
    /// 以防止与进程被迁移到另一个 CPU 时出现竞争条件。
    fn id(&self) -> usize;

    /// 当前中断是否开启
    fn intr_get(&self) -> bool;

    fn intr_on(&self);

    fn intr_off(&self);

    /// 返回当前 hart 的中断嵌套状态。
    /// 必须在关中断的情况下调用。
    fn intr_state(&self) -> &IntrState;
}

/// 每个 hart 的中断关闭嵌套状态
///
/// 只会被所属的 hart 在关中断时访问，因此使用 `Cell` 即可。
pub struct IntrState {
    /// `push_off` 的嵌套深度
    noff: Cell<u8>,
    /// 第一次 `push_off` 之前中断是否开启
    intena: Cell<bool>,
}

impl IntrState {
    pub const fn new() -> Self {
        Self {
            noff: Cell::new(0),
            intena: Cell::new(false),
        }
    }

    /// 当前嵌套深度
    pub fn depth(&self) -> u8 {
        self.noff.get()
    }
}

impl Default for IntrState {
    fn default() -> Self {
        Self::new()
    }
}

static HART: Once<&'static dyn Hart> = Once::new();

/// 安装 hart 操作，启动时由 [`super::init`] 调用一次
pub(super) fn install(hart: &'static dyn Hart) {
    let mut fresh = false;
    HART.call_once(|| {
        fresh = true;
        hart
    });
    if !fresh {
        panic!("cpu: init twice");
    }
}

#[inline]
fn hart() -> &'static dyn Hart {
    match HART.get() {
        Some(hart) => *hart,
        None => panic!("cpu: used before init"),
    }
}

/// 读取当前 hart 号。
///
/// 只在读取的瞬间关中断，防止读到一半被迁移到别的 hart；
/// 返回之后进程仍可能被迁移，调用者只能把结果当作提示（例如选择哪个空闲链表）。
pub fn cpu_id() -> usize {
    push_off();
    let id = hart().id();
    pop_off();
    id
}

/// 在已经关中断的上下文中读取 hart 号，供自旋锁记录持有者使用
///
/// # 安全性
/// 调用者必须已经调用过 `push_off()`。
#[inline]
pub(crate) unsafe fn cpu_id_locked() -> usize {
    hart().id()
}

/// 关闭当前 CPU 的中断，并记录中断关闭的嵌套次数。
///
/// 与 `intr_off()` 类似，但支持成对使用，
/// 多次调用 `push_off()` 需要相应次数的 `pop_off()` 才能恢复中断状态。
/// 如果中断原本就是关闭状态，调用后保持关闭。
pub fn push_off() {
    let hart = hart();
    let old = hart.intr_get();
    hart.intr_off();
    let c = hart.intr_state();
    if c.noff.get() == 0 {
        c.intena.set(old);
    }
    c.noff.set(c.noff.get() + 1);
}

/// 解除之前通过 `push_off()` 关闭的中断。
///
/// 只有所有嵌套的关闭操作都对应调用后，才真正重新开启中断，
/// 且仅当第一次 `push_off()` 之前中断是开启的。
///
/// # Panics
/// - 调用时中断处于开启状态；
/// - 调用次数多于 `push_off()`。
pub fn pop_off() {
    let hart = hart();
    if hart.intr_get() {
        panic!("pop_off(): interruptable");
    }
    let c = hart.intr_state();
    let noff = match c.noff.get().checked_sub(1) {
        Some(noff) => noff,
        None => panic!("pop_off(): count not match"),
    };
    c.noff.set(noff);
    if noff == 0 && c.intena.get() {
        hart.intr_on();
    }
}
