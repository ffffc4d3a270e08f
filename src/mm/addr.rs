//! 提供物理地址包装

use core::convert::TryFrom;
use core::fmt;

use crate::consts::{PGSHIFT, PGSIZE};

/// 地址类型通用接口
pub trait Addr {
    /// 获取内部地址值的不可变引用
    fn data_ref(&self) -> &usize;

    /// 获取内部地址值的可变引用
    fn data_mut(&mut self) -> &mut usize;

    /// 获取地址的usize表示
    #[inline]
    fn as_usize(&self) -> usize {
        *self.data_ref()
    }

    /// 转换为只读裸指针
    #[inline]
    fn as_ptr(&self) -> *const u8 {
        *self.data_ref() as *const u8
    }

    /// 转换为可变裸指针
    ///
    /// # 安全性
    /// 调用者需确保指针修改不会破坏内存安全
    #[inline]
    fn as_mut_ptr(&mut self) -> *mut u8 {
        *self.data_mut() as *mut u8
    }
}

/// 物理地址封装类型
///
/// # 合法性保证
/// 通过 `TryFrom` 构造的地址一定页对齐；
/// 是否落在被管理的物理内存范围内由分配器在使用时检查。
#[repr(C)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PhysAddr(usize);

impl Addr for PhysAddr {
    #[inline]
    fn data_ref(&self) -> &usize {
        &self.0
    }

    #[inline]
    fn data_mut(&mut self) -> &mut usize {
        &mut self.0
    }
}

impl PhysAddr {
    /// 从原始usize值构造物理地址
    ///
    /// # 安全性
    /// 调用者必须确保`raw`是有效的物理地址
    #[inline]
    pub unsafe fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// 解封装获取原始物理地址
    #[inline]
    pub fn into_raw(self) -> usize {
        self.0
    }

    /// 物理页号
    #[inline]
    pub fn ppn(&self) -> usize {
        self.0 >> PGSHIFT
    }
}

impl TryFrom<usize> for PhysAddr {
    type Error = &'static str;

    /// 尝试从usize创建物理地址，地址必须页对齐
    fn try_from(addr: usize) -> Result<Self, Self::Error> {
        if addr % PGSIZE != 0 {
            return Err("PhysAddr addr not aligned");
        }
        Ok(PhysAddr(addr))
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
