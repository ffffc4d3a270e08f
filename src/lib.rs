//! xv6 内核的块缓存与物理页分配器
//!
//! 平台相关的部分（hart 编号、中断开关、进程休眠与唤醒）通过
//! [`process::Hart`] 与 [`process::Scheduler`] 在启动时注入，
//! 磁盘通过 [`driver::BlockDevice`] 注入。

#![cfg_attr(not(test), no_std)]
#![warn(rust_2018_idioms)]

pub mod consts;
pub mod driver;
pub mod fs;
pub mod mm;
pub mod process;
pub mod sleeplock;
pub mod spinlock;

#[cfg(test)]
mod testenv;
