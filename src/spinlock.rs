//! 自旋锁模块
//! 自旋锁将数据包裹在自身内部以保护这些数据。

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut, Drop};
use core::sync::atomic::{fence, AtomicBool, AtomicIsize, Ordering};

use crate::process::{cpu_id_locked, pop_off, push_off};

/// 表示一个自旋锁结构，用于在多核环境下保护共享数据。
///
/// `SpinLock` 提供了互斥访问内部数据的能力，通过忙等待（busy-waiting）实现锁机制。
/// 当锁被占用时，尝试获取锁的CPU将在循环中等待，直到锁被释放。
/// 该锁还跟踪持有锁的CPU ID，用于调试和死锁检测。
///
/// 持有自旋锁期间中断是关闭的，因此绝不能在持有自旋锁时休眠。
///
/// # 字段说明
/// - `lock`: 原子布尔值，表示锁的状态（`false`=未锁定，`true`=已锁定）；
/// - `name`: 锁的名称，用于调试和标识；
/// - `cpuid`: 当前持有锁的CPU ID（-1表示无CPU持有）；
/// - `data`: 被保护的数据，通过`UnsafeCell`实现内部可变性。
#[derive(Debug)]
pub struct SpinLock<T: ?Sized> {
    lock: AtomicBool,
    name: &'static str,
    cpuid: AtomicIsize,
    data: UnsafeCell<T>,
}

// 为SpinLock实现Sync trait，允许跨线程共享（要求T是Send）
unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// 创建一个新的自旋锁实例。
    ///
    /// # 参数
    /// - `data`: 需要被保护的数据；
    /// - `name`: 锁的标识名称，用于调试。
    pub const fn new(data: T, name: &'static str) -> Self {
        Self {
            lock: AtomicBool::new(false),
            name,
            cpuid: AtomicIsize::new(-1),
            data: UnsafeCell::new(data),
        }
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// 获取自旋锁并返回一个守卫对象。
    ///
    /// 守卫对象实现了`Deref`和`DerefMut`，允许直接访问被保护数据。
    /// 当守卫对象离开作用域时，自动释放锁并恢复中断状态。
    ///
    /// # 示例
    /// ```ignore
    /// let lock = SpinLock::new(0, "test");
    /// {
    ///     let mut guard = lock.lock(); // 获取锁
    ///     *guard = 42; // 修改受保护数据
    /// } // 守卫离开作用域，自动释放锁
    /// ```
    ///
    /// # Panics
    /// 当前CPU已经持有该锁时（重入）。
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.acquire();
        SpinLockGuard {
            lock: self,
            data: unsafe { &mut *self.data.get() },
        }
    }

    /// 独占访问时直接取得数据，无需加锁
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// 检查当前CPU是否持有此锁。
    ///
    /// # 安全性
    /// 必须在禁用中断的上下文中调用，否则结果可能因进程迁移而过时。
    unsafe fn holding(&self) -> bool {
        self.lock.load(Ordering::Relaxed)
            && self.cpuid.load(Ordering::Relaxed) == cpu_id_locked() as isize
    }

    /// 获取锁的核心实现。
    ///
    /// 1. 调用`push_off()`禁用中断；
    /// 2. 检查是否已持有锁（防止死锁）；
    /// 3. 使用原子比较交换（CAS）忙等待获取锁；
    /// 4. 记录当前CPU ID。
    fn acquire(&self) {
        push_off();
        if unsafe { self.holding() } {
            panic!("spinlock {} acquire", self.name);
        }
        while self
            .lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        fence(Ordering::SeqCst);
        self.cpuid
            .store(unsafe { cpu_id_locked() } as isize, Ordering::Relaxed);
    }

    /// 释放锁的核心实现，由守卫的`Drop`调用。
    fn release(&self) {
        if unsafe { !self.holding() } {
            panic!("spinlock {} release", self.name);
        }
        self.cpuid.store(-1, Ordering::Relaxed);
        fence(Ordering::SeqCst);
        self.lock.store(false, Ordering::Release);
        pop_off();
    }
}

/// 自旋锁守卫对象，提供对受保护数据的访问。
///
/// 当守卫对象存在时，表示锁已被持有。
/// 守卫离开作用域时自动释放锁，确保锁的释放。
pub struct SpinLockGuard<'a, T: ?Sized> {
    lock: &'a SpinLock<T>,
    data: &'a mut T,
}

impl<'a, T: ?Sized> Deref for SpinLockGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.data
    }
}

impl<'a, T: ?Sized> DerefMut for SpinLockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.data
    }
}

impl<'a, T: ?Sized> Drop for SpinLockGuard<'a, T> {
    /// 当守卫离开作用域时自动释放锁，
    /// 并恢复中断状态（通过`pop_off`）
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl<'a, T: ?Sized> SpinLockGuard<'a, T> {
    /// 检查当前CPU是否持有此锁，用于调试验证。
    ///
    /// 守卫存在期间中断一直是关闭的，因此这里总是安全的。
    pub fn holding(&self) -> bool {
        unsafe { self.lock.holding() }
    }
}
