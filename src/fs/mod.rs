//! 文件系统模块
//!
//! 这里只保留块缓存；inode、日志与目录层构建在 [`Bcache`] 之上，由宿主内核提供。

mod bio;

pub use bio::{bucket_of, Bcache, Buf, BufData};
