//! 块缓存相关常量

/// 缓冲区池中的缓冲块数量
pub const NBUF: usize = 30;

/// 磁盘块大小（字节）
pub const BSIZE: usize = 1024;

/// 块号散列的模数
pub const HASH_BASE: u32 = 13;

/// 散列桶数量，桶 0 专门留给块号 0
pub const NBUCKET: usize = HASH_BASE as usize + 1;

/// 空闲缓冲块使用的设备号，不会与任何真实设备匹配
pub const NODEV: u32 = u32::MAX;
