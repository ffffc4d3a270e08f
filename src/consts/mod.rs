//! 内核核心的可调参数

pub mod fs;

/// 最大 CPU（hart）数量，同时也是物理页分配器的分区数
pub const NCPU: usize = 8;

/// 页大小（字节）
pub const PGSIZE: usize = 4096;
/// 页内偏移的位数
pub const PGSHIFT: usize = 12;

/// 分配物理页时填充的垃圾字节，用于暴露未初始化内存的使用
pub const ALLOC_JUNK: u8 = 5;
/// 释放物理页时填充的垃圾字节，用于暴露悬垂引用
pub const FREE_JUNK: u8 = 1;
