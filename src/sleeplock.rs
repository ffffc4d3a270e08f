//! 睡眠锁模块
//! 提供基于进程休眠/唤醒机制的同步原语，适用于可能长时间持有的锁。
//! 
//! 当锁被占用时，尝试获取锁的进程会进入休眠状态，避免忙等待。
//! 与自旋锁不同，持有睡眠锁期间可以再次休眠（例如等待磁盘中断）。

use core::cell::{Cell, UnsafeCell};
use core::ops::{Deref, DerefMut, Drop};

use crate::process::sched;
use crate::spinlock::SpinLock;

/// 睡眠锁结构，提供阻塞式同步机制
///
/// # 字段说明
/// - `lock`: 内部自旋锁，保护`locked`与`pid`，沿用睡眠锁的名称便于调试
/// - `locked`: 表示锁是否已被占用
/// - `pid`: 持有者的进程号，用于`holding()`检查
/// - `data`: 被保护的数据，通过`UnsafeCell`实现内部可变性
pub struct SleepLock<T: ?Sized> {
    lock: SpinLock<()>,
    locked: Cell<bool>,
    pid: Cell<usize>,
    data: UnsafeCell<T>,
}

// 为SleepLock实现Sync，允许跨线程共享（要求T是Send）
// `locked` 与 `pid` 只在持有内部自旋锁时访问
unsafe impl<T: ?Sized + Send> Sync for SleepLock<T> {}

impl<T> SleepLock<T> {
    /// 创建一个新的睡眠锁实例
    pub const fn new(data: T, name: &'static str) -> Self {
        Self {
            lock: SpinLock::new((), name),
            locked: Cell::new(false),
            pid: Cell::new(0),
            data: UnsafeCell::new(data),
        }
    }
}

impl<T: ?Sized> SleepLock<T> {
    /// 获取睡眠锁（可能阻塞进程）
    ///
    /// # 流程解释
    /// 1. 获取内部自旋锁保护临界区
    /// 2. 检查`locked`状态：
    ///   - 如果已锁定：调用`sleep()`让当前进程休眠，醒来后重新检查
    ///   - 如果未锁定：设置`locked=true`并记录持有者
    /// 3. 释放内部自旋锁
    pub fn lock(&self) -> SleepLockGuard<'_, T> {
        let mut guard = self.lock.lock();

        while self.locked.get() {
            // sleep 负责释放 guard
            sched().sleep(self.chan(), guard);
            guard = self.lock.lock();
        }

        self.locked.set(true);
        self.pid.set(sched().pid());
        drop(guard);

        SleepLockGuard {
            lock: self,
            data: unsafe { &mut *self.data.get() },
        }
    }

    /// 当前进程是否持有该锁
    pub fn holding(&self) -> bool {
        let guard = self.lock.lock();
        let r = self.locked.get() && self.pid.get() == sched().pid();
        drop(guard);
        r
    }

    /// 释放锁（由守卫的Drop调用），并唤醒等待该锁的进程
    fn unlock(&self) {
        let guard = self.lock.lock();
        self.locked.set(false);
        self.pid.set(0);
        sched().wakeup(self.chan());
        drop(guard);
    }

    /// 休眠与唤醒所用的通道：`locked`字段的地址
    #[inline]
    fn chan(&self) -> usize {
        self.locked.as_ptr() as usize
    }
}

/// 睡眠锁守卫，提供对受保护数据的访问
///
/// 守卫离开作用域时自动释放锁并唤醒等待者。
pub struct SleepLockGuard<'a, T: ?Sized> {
    lock: &'a SleepLock<T>,
    data: &'a mut T,
}

impl<'a, T: ?Sized> SleepLockGuard<'a, T> {
    /// 当前进程是否仍是该锁的持有者
    pub fn holding(&self) -> bool {
        self.lock.holding()
    }
}

impl<'a, T: ?Sized> Deref for SleepLockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &*self.data
    }
}

impl<'a, T: ?Sized> DerefMut for SleepLockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.data
    }
}

impl<'a, T: ?Sized> Drop for SleepLockGuard<'a, T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
