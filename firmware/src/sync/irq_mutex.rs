//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 中断安全互斥锁
//!
//! 和 Linux 的 spin_lock_irqsave()/spin_unlock_irqrestore() 相同：
//! 先屏蔽本地中断，再获取自旋锁；释放时先解锁，再恢复中断。
//! 临界区内只能做常数时间的操作，不能分配内存，不能阻塞。

use core::ops::{Deref, DerefMut};

use crate::arch::InterruptGuard;

/// 中断安全互斥锁
pub struct IrqMutex<T> {
    inner: spin::Mutex<T>,
}

impl<T> IrqMutex<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: spin::Mutex::new(value),
        }
    }

    /// 屏蔽中断并获取锁
    ///
    /// 同一执行上下文内不可重入（与 spin::Mutex 相同）
    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        let irq = unsafe { InterruptGuard::new() };
        IrqMutexGuard {
            guard: self.inner.lock(),
            _irq: irq,
        }
    }

    /// 尝试获取锁（非阻塞）
    pub fn try_lock(&self) -> Option<IrqMutexGuard<'_, T>> {
        let irq = unsafe { InterruptGuard::new() };
        // 获取失败时 irq 在这里被丢弃，中断立即恢复
        let guard = self.inner.try_lock()?;
        Some(IrqMutexGuard { guard, _irq: irq })
    }
}

/// 互斥锁守护（RAII）
///
/// 字段按声明顺序丢弃：先释放自旋锁，再恢复中断
pub struct IrqMutexGuard<'a, T> {
    guard: spin::MutexGuard<'a, T>,
    _irq: InterruptGuard,
}

impl<T> Deref for IrqMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for IrqMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
