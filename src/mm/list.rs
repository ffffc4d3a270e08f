//! 侵入式空闲页链表
//!
//! 链表节点直接写在空闲页的开头，因此不需要额外的内存。
//! 链表本身不是线程安全的，由外层的自旋锁保护。

use core::ptr;

/// 写在空闲页开头的节点
#[repr(C)]
struct Run {
    next: *mut Run,
}

/// 单向链表实现的空闲页栈
///
/// 只保存头指针，结构体可以被自由移动。
pub struct FreeList {
    head: *mut Run,
    len: usize,
}

// 链表中的页只会在持有外层锁时被访问
unsafe impl Send for FreeList {}

impl FreeList {
    pub const fn new() -> Self {
        Self {
            head: ptr::null_mut(),
            len: 0,
        }
    }

    /// 将空闲页压入栈顶
    ///
    /// # 安全性
    /// - `raw_addr` 必须对齐且指向至少能容纳一个指针的可写内存；
    /// - 该内存此后归链表所有，直到被 `pop` 取出。
    pub unsafe fn push(&mut self, raw_addr: usize) {
        let run = raw_addr as *mut Run;
        ptr::write(run, Run { next: self.head });
        self.head = run;
        self.len += 1;
    }

    /// 弹出栈顶的空闲页，链表为空时返回 `None`
    pub fn pop(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let run = self.head;
        // 安全性：非空的 head 一定是之前 push 进来的页
        self.head = unsafe { (*run).next };
        self.len -= 1;
        Some(run as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_null()
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl Default for FreeList {
    fn default() -> Self {
        Self::new()
    }
}
