//! 缓存层
//!
//! 缓冲块按块号散列到 `NBUCKET` 个桶中，每个桶有自己的自旋锁，
//! 命中时只需要获取目标桶的锁。未命中时才获取全局锁，
//! 在所有桶中挑选引用计数为 0 且时间戳最小的缓冲块回收。
//!
//! 锁的顺序：全局锁 -> 桶锁（按下标递增）-> 缓冲块的睡眠锁。
//! 获取睡眠锁之前必须释放所有自旋锁。

use array_macro::array;

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::consts::fs::{BSIZE, HASH_BASE, NBUCKET, NBUF, NODEV};
use crate::driver::BlockDevice;
use crate::sleeplock::{SleepLock, SleepLockGuard};
use crate::spinlock::SpinLock;

/// 链表中代表桶头（哨兵）的下标
const HEAD: usize = usize::MAX;

/// 把块号映射到桶下标。
///
/// 块号 0 独占桶 0，其余块号按 `HASH_BASE` 取模后落在 `1..NBUCKET`。
#[inline]
pub fn bucket_of(blockno: u32) -> usize {
    if blockno == 0 {
        0
    } else {
        (blockno % HASH_BASE) as usize + 1
    }
}

/// 全局缓冲区缓存（Buffer Cache）结构体，用于块设备的读写缓存。
///
/// `Bcache` 提供了一个固定大小的内存缓冲区池，用于缓存磁盘块数据，
/// 以减少重复的磁盘访问并提升 I/O 性能。缓冲块从不被创建或销毁，只会被重新利用。
///
/// 该结构通常在内核初始化阶段被构造一次，并贯穿操作系统运行期间，
/// 是文件系统与块设备驱动之间的关键缓冲层。
pub struct Bcache<D> {
    /// 全局锁，只在未命中、需要跨桶挑选回收对象时持有。
    lock: SpinLock<()>,

    /// 散列桶，每个桶的锁保护桶内链表以及挂在该桶上的所有 `BufCtrl`。
    buckets: [SpinLock<Bucket>; NBUCKET],

    /// 缓冲块的元数据，下标与 `bufs` 一一对应。
    ctrl: [CtrlCell; NBUF],

    /// 缓冲块数组，每个缓冲块包含块数据和一个睡眠锁。
    bufs: [BufInner; NBUF],

    /// 逻辑时钟，每次访问缓冲块时递增，用作 LRU 时间戳。
    ticks: AtomicUsize,

    disk: D,
}

impl<D: BlockDevice> Bcache<D> {
    /// 构造缓冲区缓存，所有缓冲块起初都挂在桶 0 上，且不对应任何块。
    pub fn new(disk: D) -> Self {
        let mut cache = Self {
            lock: SpinLock::new((), "bcache"),
            buckets: array![_ => SpinLock::new(Bucket::new(), "bcache.bucket"); NBUCKET],
            ctrl: array![_ => CtrlCell::new(); NBUF],
            bufs: array![_ => BufInner::new(); NBUF],
            ticks: AtomicUsize::new(0),
            disk,
        };

        let bucket = cache.buckets[0].get_mut();
        for i in 0..NBUF {
            // 安全性：独占 cache，尚无其他访问者
            unsafe { bucket.push(&cache.ctrl, i) };
        }

        log::info!("bcache: {} buffers of {} bytes in {} buckets", NBUF, BSIZE, NBUCKET);
        cache
    }

    /// 获取指定设备与块号对应的缓冲块，并独占它。
    ///
    /// # 功能说明
    /// 查找设备 `dev` 上的块 `blockno`，若未缓存则回收一个空闲的缓冲块。
    /// 无论哪种情况，返回的缓冲块都已被当前进程独占（持有睡眠锁）。
    /// 返回的缓冲块不一定含有有效数据，需要数据时使用 [`Bcache::bread`]。
    ///
    /// # 流程解释
    /// - 根据块号算出桶下标，只获取该桶的锁；
    /// - 命中：增加引用计数、刷新时间戳后释放桶锁；
    /// - 未命中：释放桶锁，进入 `recycle` 的慢路径；
    /// - 最后在不持有任何自旋锁的情况下等待缓冲块的睡眠锁。
    ///
    /// # 参数
    /// - `dev`：设备号；
    /// - `blockno`：块号。
    ///
    /// # 返回值
    /// 已加锁的 [`Buf`]，离开作用域时自动释放。
    ///
    /// # Panics
    /// 所有缓冲块都在使用中（引用计数均大于 0）时。
    pub fn bget(&self, dev: u32, blockno: u32) -> Buf<'_, D> {
        let hc = bucket_of(blockno);

        let bucket = self.buckets[hc].lock();
        if let Some(index) = bucket.find(&self.ctrl, dev, blockno) {
            unsafe { self.hit(index) };
            drop(bucket);
            return self.buf(index, dev, blockno);
        }
        drop(bucket);

        self.recycle(dev, blockno, hc)
    }

    /// 未命中时的慢路径。
    ///
    /// # 流程解释
    /// - 获取全局锁，再按下标递增的顺序获取所有桶锁，扫描期间
    ///   任何缓冲块的引用计数和时间戳都不会被快路径修改；
    /// - 再次查找目标桶，其他进程可能已经缓存了这个块；
    /// - 在所有桶中挑选引用计数为 0 且时间戳最小的缓冲块；
    /// - 若它不在目标桶中，把它移到目标桶；
    /// - 重置身份，标记数据无效，引用计数置 1；
    /// - 释放全部自旋锁后等待睡眠锁。
    fn recycle(&self, dev: u32, blockno: u32, hc: usize) -> Buf<'_, D> {
        let global = self.lock.lock();
        let mut buckets = array![i => self.buckets[i].lock(); NBUCKET];

        // 在释放目标桶锁之后，其他进程可能已经缓存了这个块
        if let Some(index) = buckets[hc].find(&self.ctrl, dev, blockno) {
            unsafe { self.hit(index) };
            drop(buckets);
            drop(global);
            return self.buf(index, dev, blockno);
        }

        // (下标, 所在桶, 时间戳)，时间戳相同时先扫描到的胜出
        let mut lru: Option<(usize, usize, usize)> = None;
        for (bi, bucket) in buckets.iter().enumerate() {
            for i in bucket.iter(&self.ctrl) {
                let b = unsafe { self.ctrl[i].get_ref() };
                if b.refcnt == 0 && lru.map_or(true, |(_, _, stamp)| b.stamp < stamp) {
                    lru = Some((i, bi, b.stamp));
                }
            }
        }
        let (index, old) = match lru {
            Some((index, old, _)) => (index, old),
            None => panic!("bget: no buffers"),
        };

        // 安全性：持有所有桶锁
        unsafe {
            if old != hc {
                buckets[old].remove(&self.ctrl, index);
                buckets[hc].push(&self.ctrl, index);
            }
            let b = self.ctrl[index].get();
            b.dev = dev;
            b.blockno = blockno;
            b.refcnt = 1;
            b.stamp = self.tick();
        }
        self.bufs[index].valid.store(false, Ordering::Relaxed);
        log::trace!("bcache: buf {} now caches block {} of dev {}", index, blockno, dev);

        drop(buckets);
        drop(global);
        self.buf(index, dev, blockno)
    }

    /// 返回一个含有指定块内容的、已加锁的缓冲块。
    ///
    /// # 功能说明
    /// 在 [`Bcache::bget`] 的基础上保证数据有效：
    /// 缓存中已有有效数据时直接返回，否则从磁盘读入。
    ///
    /// # 参数
    /// - `dev`：设备号；
    /// - `blockno`：块号。
    ///
    /// # 返回值
    /// 已加锁且数据有效的 [`Buf`]。读盘期间调用者可能休眠。
    pub fn bread(&self, dev: u32, blockno: u32) -> Buf<'_, D> {
        let mut b = self.bget(dev, blockno);
        b.load();
        b
    }

    /// 命中：增加引用计数并刷新时间戳。
    ///
    /// # 安全性
    /// 调用者必须持有 `index` 所在桶的锁。
    unsafe fn hit(&self, index: usize) {
        let b = self.ctrl[index].get();
        b.refcnt += 1;
        b.stamp = self.tick();
    }

    /// 等待并获取缓冲块的睡眠锁，此时不得持有任何自旋锁
    fn buf(&self, index: usize, dev: u32, blockno: u32) -> Buf<'_, D> {
        Buf {
            index,
            dev,
            blockno,
            cache: self,
            data: Some(self.bufs[index].data.lock()),
            _not_send: PhantomData,
        }
    }

    /// 引用计数大于 0 的缓冲块不会被回收，因此它一定挂在 `bucket_of(blockno)` 上。
    fn brelse(&self, index: usize, blockno: u32) {
        let guard = self.buckets[bucket_of(blockno)].lock();
        let b = unsafe { self.ctrl[index].get() };
        if b.refcnt == 0 {
            panic!("brelse: refcnt");
        }
        b.refcnt -= 1;
        b.stamp = self.tick();
        drop(guard);
    }

    fn pin(&self, index: usize, blockno: u32) {
        let guard = self.buckets[bucket_of(blockno)].lock();
        let b = unsafe { self.ctrl[index].get() };
        b.refcnt += 1;
        drop(guard);
    }

    fn unpin(&self, index: usize, blockno: u32) {
        let guard = self.buckets[bucket_of(blockno)].lock();
        let b = unsafe { self.ctrl[index].get() };
        if b.refcnt <= 1 {
            panic!("buf unpin not match");
        }
        b.refcnt -= 1;
        drop(guard);
    }

    #[inline]
    fn tick(&self) -> usize {
        self.ticks.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// 已加锁的缓冲块。
///
/// 持有者独占块数据，离开作用域时释放睡眠锁并减少引用计数（即 `brelse`）。
/// 缓冲块不能被转交给其他进程，因此没有实现 `Send`。
pub struct Buf<'a, D: BlockDevice> {
    index: usize,
    dev: u32,
    blockno: u32,
    cache: &'a Bcache<D>,
    /// 只在 `drop` 中被取走
    data: Option<SleepLockGuard<'a, BufData>>,
    _not_send: PhantomData<*const ()>,
}

impl<'a, D: BlockDevice> Buf<'a, D> {
    /// 缓冲块所属的设备号
    pub fn dev(&self) -> u32 {
        self.dev
    }

    /// 缓冲块对应的块号
    pub fn read_blockno(&self) -> u32 {
        self.blockno
    }

    /// 若缓冲块中没有有效数据，则从磁盘读入。
    pub fn load(&mut self) {
        let valid = &self.cache.bufs[self.index].valid;
        if !valid.load(Ordering::Relaxed) {
            self.rw(false);
            valid.store(true, Ordering::Relaxed);
        }
    }

    /// 将缓冲块的内容写回磁盘，调用者必须持有该缓冲块。
    pub fn bwrite(&mut self) {
        if !self.holding() {
            panic!("bwrite");
        }
        self.rw(true);
    }

    fn rw(&mut self, writing: bool) {
        let disk = &self.cache.disk;
        let data = match self.data.as_mut() {
            Some(guard) => guard.deref_mut(),
            None => panic!("buf rw: released"),
        };
        disk.rw(self.dev, self.blockno, data, writing);
    }

    /// 块数据，持有者独占
    pub fn data(&self) -> &BufData {
        match self.data.as_ref() {
            Some(guard) => guard.deref(),
            None => panic!("buf data: released"),
        }
    }

    /// 可写的块数据，修改后需要 [`Buf::bwrite`] 才会落盘
    pub fn data_mut(&mut self) -> &mut BufData {
        match self.data.as_mut() {
            Some(guard) => guard.deref_mut(),
            None => panic!("buf data: released"),
        }
    }

    /// 给只接受裸指针的调用者使用，例如 DMA 描述符
    pub fn raw_data(&self) -> *const BufData {
        self.data()
    }

    pub fn raw_data_mut(&mut self) -> *mut BufData {
        self.data_mut()
    }

    /// 增加引用计数，使该块在释放后仍不会被回收。
    pub fn pin(&self) {
        self.cache.pin(self.index, self.blockno);
    }

    /// 撤销一次 [`Buf::pin`]。
    ///
    /// # Panics
    /// 引用计数只剩当前持有者自己时。
    pub fn unpin(&self) {
        self.cache.unpin(self.index, self.blockno);
    }

    /// 显式释放，等同于 `drop`
    pub fn release(self) {}

    fn holding(&self) -> bool {
        self.data.as_ref().map_or(false, |guard| guard.holding())
    }
}

impl<'a, D: BlockDevice> Drop for Buf<'a, D> {
    fn drop(&mut self) {
        if !self.holding() {
            panic!("brelse");
        }
        drop(self.data.take());
        self.cache.brelse(self.index, self.blockno);
    }
}

/// 桶头，同时也是桶内双向循环链表的哨兵。
/// `next`/`prev` 为 `BufCtrl` 的下标，`HEAD` 指回桶头自身。
struct Bucket {
    next: usize,
    prev: usize,
}

impl Bucket {
    const fn new() -> Self {
        Self {
            next: HEAD,
            prev: HEAD,
        }
    }

    fn find(&self, ctrl: &[CtrlCell; NBUF], dev: u32, blockno: u32) -> Option<usize> {
        self.iter(ctrl).find(|&i| {
            let b = unsafe { ctrl[i].get_ref() };
            b.dev == dev && b.blockno == blockno
        })
    }

    fn iter<'a>(&'a self, ctrl: &'a [CtrlCell; NBUF]) -> BucketIter<'a> {
        BucketIter { ctrl, cur: self.next }
    }

    /// 把 `i` 插到桶头之后。
    ///
    /// # 安全性
    /// 调用者持有本桶的锁，且 `i` 当前不在任何链表中。
    unsafe fn push(&mut self, ctrl: &[CtrlCell; NBUF], i: usize) {
        let first = self.next;
        {
            let b = ctrl[i].get();
            b.prev = HEAD;
            b.next = first;
        }
        if first == HEAD {
            self.prev = i;
        } else {
            ctrl[first].get().prev = i;
        }
        self.next = i;
    }

    /// 把 `i` 从本桶中摘下。
    ///
    /// # 安全性
    /// 调用者持有本桶的锁，且 `i` 在本桶中。
    unsafe fn remove(&mut self, ctrl: &[CtrlCell; NBUF], i: usize) {
        let (prev, next) = {
            let b = ctrl[i].get_ref();
            (b.prev, b.next)
        };
        if prev == HEAD {
            self.next = next;
        } else {
            ctrl[prev].get().next = next;
        }
        if next == HEAD {
            self.prev = prev;
        } else {
            ctrl[next].get().prev = prev;
        }
    }
}

/// 只能通过桶锁守卫借出的 `&Bucket` 构造，迭代期间该桶一直被锁住
struct BucketIter<'a> {
    ctrl: &'a [CtrlCell; NBUF],
    cur: usize,
}

impl<'a> Iterator for BucketIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cur == HEAD {
            return None;
        }
        let i = self.cur;
        self.cur = unsafe { self.ctrl[i].get_ref() }.next;
        Some(i)
    }
}

/// 缓冲块元数据
struct BufCtrl {
    dev: u32,
    blockno: u32,
    /// 持有者与 pin 的总数
    refcnt: usize,
    /// 最近一次使用时的逻辑时钟
    stamp: usize,
    prev: usize,
    next: usize,
}

struct CtrlCell(UnsafeCell<BufCtrl>);

// 每个 BufCtrl 只在持有其所在桶的锁时被访问
unsafe impl Sync for CtrlCell {}

impl CtrlCell {
    const fn new() -> Self {
        Self(UnsafeCell::new(BufCtrl {
            dev: NODEV,
            blockno: 0,
            refcnt: 0,
            stamp: 0,
            prev: HEAD,
            next: HEAD,
        }))
    }

    /// # 安全性
    /// 调用者持有该缓冲块所在桶的锁，且不存在其他对它的引用。
    #[allow(clippy::mut_from_ref)]
    unsafe fn get(&self) -> &mut BufCtrl {
        &mut *self.0.get()
    }

    /// # 安全性
    /// 调用者持有该缓冲块所在桶的锁。
    unsafe fn get_ref(&self) -> &BufCtrl {
        &*self.0.get()
    }
}

struct BufInner {
    /// 数据是否已从磁盘读入
    valid: AtomicBool,
    data: SleepLock<BufData>,
}

impl BufInner {
    const fn new() -> Self {
        Self {
            valid: AtomicBool::new(false),
            data: SleepLock::new(BufData::new(), "buffer"),
        }
    }
}

/// 一个磁盘块的数据
#[repr(C, align(8))]
pub struct BufData([u8; BSIZE]);

impl BufData {
    pub const fn new() -> Self {
        Self([0; BSIZE])
    }
}

impl Default for BufData {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for BufData {
    type Target = [u8; BSIZE];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for BufData {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testenv;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;
    use std::thread;
    use std::vec::Vec;

    #[derive(Default)]
    struct MemDisk {
        blocks: Mutex<HashMap<(u32, u32), [u8; BSIZE]>>,
        reads: Mutex<HashMap<(u32, u32), usize>>,
    }

    impl MemDisk {
        fn reads(&self, dev: u32, blockno: u32) -> usize {
            self.reads.lock().unwrap().get(&(dev, blockno)).copied().unwrap_or(0)
        }
    }

    impl BlockDevice for MemDisk {
        fn rw(&self, dev: u32, blockno: u32, data: &mut BufData, writing: bool) {
            let mut blocks = self.blocks.lock().unwrap();
            if writing {
                blocks.insert((dev, blockno), **data);
            } else {
                *self.reads.lock().unwrap().entry((dev, blockno)).or_default() += 1;
                match blocks.get(&(dev, blockno)) {
                    Some(block) => data.copy_from_slice(block),
                    None => data.fill(0),
                }
            }
        }
    }

    impl<D: BlockDevice> Bcache<D> {
        /// 返回 (下标, 引用计数)
        fn lookup(&self, dev: u32, blockno: u32) -> Option<(usize, usize)> {
            let bucket = self.buckets[bucket_of(blockno)].lock();
            bucket
                .find(&self.ctrl, dev, blockno)
                .map(|i| (i, unsafe { self.ctrl[i].get_ref() }.refcnt))
        }
    }

    fn cache() -> Bcache<MemDisk> {
        testenv::setup();
        Bcache::new(MemDisk::default())
    }

    #[test]
    fn bucket_routing() {
        assert_eq!(bucket_of(0), 0);
        assert_eq!(bucket_of(1), 2);
        assert_eq!(bucket_of(12), 13);
        assert_eq!(bucket_of(13), 1);
        for blockno in 1..5000 {
            let hc = bucket_of(blockno);
            assert!(hc >= 1 && hc < NBUCKET);
        }
        assert!(bucket_of(u32::MAX) < NBUCKET);
    }

    #[test]
    fn cached_block_is_read_once() {
        let cache = cache();
        {
            let b = cache.bread(1, 7);
            assert_eq!(b.dev(), 1);
            assert_eq!(b.read_blockno(), 7);
        }
        cache.bread(1, 7);
        assert_eq!(cache.disk.reads(1, 7), 1);
        assert_eq!(cache.lookup(1, 7).map(|(_, rc)| rc), Some(0));
    }

    #[test]
    fn devices_are_distinct() {
        let cache = cache();
        let a = cache.bread(1, 7);
        let b = cache.bread(2, 7);
        assert_ne!(a.index, b.index);
        drop(a);
        drop(b);
        assert_eq!(cache.disk.reads(1, 7), 1);
        assert_eq!(cache.disk.reads(2, 7), 1);
    }

    #[test]
    fn block_zero_is_cacheable() {
        let cache = cache();
        {
            let mut b = cache.bread(1, 0);
            b.data_mut()[0] = 9;
            b.bwrite();
        }
        let b = cache.bread(1, 0);
        assert_eq!(b.data()[0], 9);
        assert_eq!(cache.disk.reads(1, 0), 1);
    }

    #[test]
    fn written_block_survives_eviction() {
        let cache = cache();
        {
            let mut b = cache.bread(1, 42);
            b.data_mut().fill(0xab);
            b.data_mut()[0] = 7;
            b.bwrite();
        }
        for blockno in 100..100 + NBUF as u32 {
            cache.bread(1, blockno);
        }
        assert!(cache.lookup(1, 42).is_none());

        let b = cache.bread(1, 42);
        assert_eq!(cache.disk.reads(1, 42), 2);
        assert_eq!(b.data()[0], 7);
        assert!(b.data()[1..].iter().all(|&x| x == 0xab));
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = cache();
        for blockno in 1..=NBUF as u32 {
            cache.bread(1, blockno);
        }
        // 再次使用块 1，使块 2 成为最久未使用的
        cache.bread(1, 1);
        cache.bread(1, 1000);

        assert!(cache.lookup(1, 2).is_none());
        assert!(cache.lookup(1, 1).is_some());
        for blockno in 3..=NBUF as u32 {
            assert!(cache.lookup(1, blockno).is_some());
        }
    }

    #[test]
    fn held_buffer_is_never_evicted() {
        let cache = cache();
        let held = cache.bread(1, 1);
        for blockno in 2..=NBUF as u32 {
            cache.bread(1, blockno);
        }
        cache.bread(1, 999);

        assert_eq!(cache.lookup(1, 1).map(|(_, rc)| rc), Some(1));
        assert!(cache.lookup(1, 2).is_none());
        drop(held);
    }

    #[test]
    #[should_panic(expected = "bget: no buffers")]
    fn exhausted_pool_panics() {
        let cache = cache();
        let _held: Vec<_> = (1..=NBUF as u32).map(|n| cache.bget(1, n)).collect();
        cache.bget(1, 0xdead);
    }

    #[test]
    fn pinned_buffer_survives_pressure() {
        let cache = cache();
        {
            let b = cache.bread(1, 5);
            b.pin();
        }
        assert_eq!(cache.lookup(1, 5).map(|(_, rc)| rc), Some(1));

        for blockno in 100..200 {
            cache.bread(1, blockno);
        }

        let b = cache.bread(1, 5);
        assert_eq!(cache.disk.reads(1, 5), 1);
        b.unpin();
        drop(b);
        assert_eq!(cache.lookup(1, 5).map(|(_, rc)| rc), Some(0));
    }

    #[test]
    #[should_panic(expected = "buf unpin not match")]
    fn unpin_without_pin() {
        let cache = cache();
        let b = cache.bread(1, 5);
        b.unpin();
    }

    #[test]
    fn same_block_is_exclusive() {
        const THREADS: u64 = 8;
        const ROUNDS: u64 = 200;
        let cache = cache();
        let inside = AtomicBool::new(false);
        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..ROUNDS {
                        let mut b = cache.bread(1, 3);
                        assert!(!inside.swap(true, Ordering::SeqCst));
                        let n = u64::from_le_bytes(b.data()[..8].try_into().unwrap());
                        b.data_mut()[..8].copy_from_slice(&(n + 1).to_le_bytes());
                        inside.store(false, Ordering::SeqCst);
                    }
                });
            }
        });
        let b = cache.bread(1, 3);
        assert_eq!(u64::from_le_bytes(b.data()[..8].try_into().unwrap()), THREADS * ROUNDS);
        assert_eq!(cache.disk.reads(1, 3), 1);
    }

    #[test]
    fn blocks_keep_identity_under_eviction() {
        const BLOCKS: u32 = 64;
        let cache = cache();
        thread::scope(|s| {
            for t in 0..8u32 {
                let cache = &cache;
                s.spawn(move || {
                    for k in 0..300u32 {
                        let blockno = (t * 7 + k * 5) % BLOCKS + 1;
                        let mut b = cache.bread(1, blockno);
                        assert_eq!(b.read_blockno(), blockno);
                        let tag = blockno as u8;
                        assert!(
                            b.data().iter().all(|&x| x == 0) || b.data().iter().all(|&x| x == tag)
                        );
                        if k % 3 == 0 {
                            b.data_mut().fill(tag);
                            b.bwrite();
                        }
                    }
                });
            }
        });
        for blockno in 1..=BLOCKS {
            assert!(cache.lookup(1, blockno).map_or(true, |(_, rc)| rc == 0));
        }
    }
}
