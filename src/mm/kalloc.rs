//! 物理页分配器
//!
//! 为页表、内核栈、管道缓冲区与用户进程内存分配整页物理内存。
//! 每个 hart 拥有自己的空闲链表和锁，本地链表为空时按 hart 编号顺序
//! 从其他 hart 的链表中"偷"一页。每个物理页带有引用计数，
//! 以支持写时复制等共享映射：只有最后一个引用被释放时，页才回到空闲链表。

use array_macro::array;

use core::fmt;
use core::mem::size_of;
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::consts::{ALLOC_JUNK, FREE_JUNK, NCPU, PGSIZE};
use crate::process::cpu_id;
use crate::spinlock::SpinLock;

use super::list::FreeList;
use super::{pg_round_down, pg_round_up, Addr, PhysAddr};

/// 所有 hart 的空闲链表都为空
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("out of physical memory")
    }
}

/// 按 hart 分区的物理页分配器。
///
/// 在启动时通过 [`Kmem::new`] 接管一段物理内存，此后被所有 hart 共享。
/// 一个页要么在某个 hart 的空闲链表上（引用计数为 0），
/// 要么已被分配（引用计数至少为 1），不会同时出现在两个链表上。
pub struct Kmem {
    /// 每个 hart 一个空闲链表
    lists: [SpinLock<FreeList>; NCPU],

    /// 引用计数表，放在被管理内存的开头，第 i 项对应 `base + i * PGSIZE`
    refcnt: *const AtomicUsize,

    /// 第一个可分配页
    base: usize,

    /// 可分配页的上界（不含）
    end: usize,
}

// 引用计数表在 Kmem 的整个生命周期内有效，且只通过原子操作访问
unsafe impl Send for Kmem {}
unsafe impl Sync for Kmem {}

impl Kmem {
    /// 接管物理内存 `[start, end)`。
    ///
    /// 区间先按页对齐收缩，开头若干页用来存放引用计数表，
    /// 其余的页填充 `FREE_JUNK` 后全部挂到 hart 0 的空闲链表上。
    ///
    /// # 安全性
    /// - `[start, end)` 必须是可读写、不被任何其他代码使用的内存；
    /// - 这段内存必须比返回的 `Kmem` 活得更久。
    ///
    /// # Panics
    /// 区间太小，放下引用计数表后没有剩余的页。
    pub unsafe fn new(start: usize, end: usize) -> Self {
        let start = pg_round_up(start);
        let end = pg_round_down(end);
        if start >= end {
            panic!("kmem: empty range [{:#x}, {:#x})", start, end);
        }

        // 按整段内存的页数分配表项，会略多于实际的可分配页数
        let npages = (end - start) / PGSIZE;
        let table = start as *mut AtomicUsize;
        ptr::write_bytes(table, 0, npages);
        let base = pg_round_up(start + npages * size_of::<AtomicUsize>());
        if base >= end {
            panic!("kmem: no frames left after {:#x} bytes of meta data", base - start);
        }

        let mut kmem = Self {
            lists: array![_ => SpinLock::new(FreeList::new(), "kmem"); NCPU],
            refcnt: table,
            base,
            end,
        };

        let list = kmem.lists[0].get_mut();
        for raw in (base..end).step_by(PGSIZE) {
            ptr::write_bytes(raw as *mut u8, FREE_JUNK, PGSIZE);
            list.push(raw);
        }

        log::info!(
            "kmem: available physical memory [{:#x}, {:#x}), {} frames",
            base,
            end,
            list.len()
        );
        #[cfg(feature = "verbose_init_info")]
        log::info!(
            "kmem: {:#x} bytes of reference counts at {:#x}, {} per-hart free lists",
            base - start,
            start,
            NCPU
        );

        kmem
    }

    /// 分配一页物理内存。
    ///
    /// # 功能说明
    /// 为页表、内核栈或用户内存分配一个 `PGSIZE` 大小的物理页。
    /// 返回的页被填充为 `ALLOC_JUNK`，引用计数为 1。
    ///
    /// # 流程解释
    /// - 在关中断的瞬间读取当前 hart 号；
    /// - 获取本 hart 链表的锁弹出一页，随即释放；
    /// - 本地链表为空时调用 `steal`；
    /// - 把引用计数从 0 置为 1，填充垃圾数据。
    ///
    /// # 返回值
    /// - `Ok(PhysAddr)`：分配到的页
    /// - `Err(AllocError)`：所有 hart 的空闲链表都为空；分配器本身不会重试
    pub fn kalloc(&self) -> Result<PhysAddr, AllocError> {
        let id = Self::hart();

        // 守卫在这条语句结束时释放，偷页期间不持有本地锁
        let local = self.lists[id].lock().pop();
        let raw = match local {
            Some(raw) => raw,
            None => match self.steal(id) {
                Some(raw) => raw,
                None => {
                    #[cfg(feature = "kernel_warning")]
                    log::warn!("kalloc: out of memory on hart {}", id);
                    return Err(AllocError);
                }
            },
        };

        if self.refcnt(raw, "kalloc").swap(1, Ordering::AcqRel) != 0 {
            panic!("kalloc: free frame {:#x} still referenced", raw);
        }
        // 填充垃圾数据，暴露对未初始化内存的使用
        unsafe { ptr::write_bytes(raw as *mut u8, ALLOC_JUNK, PGSIZE) };

        Ok(unsafe { PhysAddr::from_raw(raw) })
    }

    /// 从其他 hart 的空闲链表偷一页。
    ///
    /// # 流程解释
    /// 按 hart 编号递增的顺序跳过自己，依次获取每个链表的锁并尝试弹出一页，
    /// 取到即停止。任一时刻最多持有一把链表锁。
    ///
    /// # 参数
    /// - `id`：当前 hart 号，调用前必须已经释放它的链表锁。
    ///
    /// # 返回值
    /// 偷到的页；所有其他链表都为空时返回 `None`。
    fn steal(&self, id: usize) -> Option<usize> {
        for other in (0..NCPU).filter(|&other| other != id) {
            let raw = self.lists[other].lock().pop();
            if let Some(raw) = raw {
                log::trace!("kalloc: hart {} stole frame {:#x} from hart {}", id, raw, other);
                return Some(raw);
            }
        }
        None
    }

    /// 释放一个引用。
    ///
    /// # 功能说明
    /// 撤销调用者对 `pa` 的一个引用，最后一个引用消失时回收这一页。
    ///
    /// # 流程解释
    /// - 检查 `pa` 页对齐且落在可分配区间内；
    /// - 原子地把引用计数减一，计数已为 0 说明页没有被分配；
    /// - 若仍有其他引用则直接返回，页的内容保持不变；
    /// - 否则填充 `FREE_JUNK`，压入当前 hart 的空闲链表。
    ///
    /// # 参数
    /// - `pa`：之前由 [`Kmem::kalloc`] 返回的页。
    ///
    /// # Panics
    /// - `pa` 未按页对齐，或不在被管理的范围内；
    /// - `pa` 当前没有被分配（例如重复释放）。
    pub fn kfree(&self, pa: PhysAddr) {
        let raw = pa.as_usize();
        let prev = self
            .refcnt(raw, "kfree")
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match prev {
            Err(_) => panic!("kfree: frame {:#x} not allocated", raw),
            Ok(n) if n > 1 => return,
            Ok(_) => {}
        }

        // 填充垃圾数据，暴露悬垂引用
        unsafe {
            ptr::write_bytes(raw as *mut u8, FREE_JUNK, PGSIZE);
            self.lists[Self::hart()].lock().push(raw);
        }
    }

    /// 为已分配的页增加一个引用，例如写时复制时多了一个映射。
    ///
    /// # Panics
    /// 页当前没有被分配。
    pub fn increase_rc(&self, pa: PhysAddr) {
        let raw = pa.as_usize();
        if self
            .refcnt(raw, "increase_rc")
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if n == 0 {
                    None
                } else {
                    Some(n + 1)
                }
            })
            .is_err()
        {
            panic!("increase_rc: frame {:#x} not allocated", raw);
        }
    }

    /// 撤销一个引用但不释放页，用于某个映射被单独拆除的情形。
    ///
    /// # Panics
    /// 这是最后一个引用；此时应当调用 [`Kmem::kfree`]，否则这一页将永远无法回收。
    pub fn decrease_rc(&self, pa: PhysAddr) {
        let raw = pa.as_usize();
        if self
            .refcnt(raw, "decrease_rc")
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if n <= 1 {
                    None
                } else {
                    Some(n - 1)
                }
            })
            .is_err()
        {
            panic!("decrease_rc: last reference of frame {:#x}", raw);
        }
    }

    /// 页当前的引用计数
    pub fn get_rc(&self, pa: PhysAddr) -> usize {
        self.refcnt(pa.as_usize(), "get_rc").load(Ordering::Acquire)
    }

    /// 所有 hart 的空闲页总数
    pub fn nfree(&self) -> usize {
        self.lists.iter().map(|list| list.lock().len()).sum()
    }

    /// 指定 hart 的空闲页数
    ///
    /// # Panics
    /// `hart` 不小于 `NCPU`。
    pub fn nfree_on(&self, hart: usize) -> usize {
        self.lists[Self::checked(hart)].lock().len()
    }

    /// 可分配页的区间 `[base, end)`，不含开头的引用计数表
    pub fn range(&self) -> (usize, usize) {
        (self.base, self.end)
    }

    /// 当前 hart 的编号，同时也是它的空闲链表下标
    fn hart() -> usize {
        Self::checked(cpu_id())
    }

    fn checked(hart: usize) -> usize {
        if hart >= NCPU {
            panic!("kmem: hart {} out of range", hart);
        }
        hart
    }

    fn refcnt(&self, raw: usize, who: &'static str) -> &AtomicUsize {
        if raw % PGSIZE != 0 || raw < self.base || raw >= self.end {
            panic!("{}: bad frame {:#x}", who, raw);
        }
        unsafe { &*self.refcnt.add((raw - self.base) / PGSIZE) }
    }
}
