//! 设备驱动接口

use crate::fs::BufData;

/// 块设备驱动需要提供的接口，例如 virtio 磁盘。
pub trait BlockDevice: Sync {
    /// 同步地在设备 `dev` 的第 `blockno` 块与 `data` 之间传输一整块数据。
    ///
    /// `writing` 为 `true` 时写盘，否则读盘。
    /// 调用者持有该缓冲块的睡眠锁，驱动可以让调用者休眠直到磁盘中断到来，
    /// 返回时传输已经完成。
    fn rw(&self, dev: u32, blockno: u32, data: &mut BufData, writing: bool);
}
