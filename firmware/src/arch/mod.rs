//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 体系结构相关：本地中断屏蔽
//!
//! 对应 Linux 的 local_irq_save()/local_irq_restore()
//! - riscv64 (S 模式)：sstatus.SIE
//! - riscv32 (M 模式，无操作系统的 MCU)：mstatus.MIE
//! - 其他目标（主机测试）：空操作，互斥完全由自旋锁提供

#[cfg(all(target_os = "none", any(target_arch = "riscv64", target_arch = "riscv32")))]
use core::arch::asm;

/// 中断保护 RAII 守卫
///
/// 在作用域内禁用中断，离开时恢复进入前的中断状态
pub struct InterruptGuard {
    flags: usize,
    // 中断状态属于当前 hart，守卫不能跨线程移动
    _not_send: core::marker::PhantomData<*const ()>,
}

impl InterruptGuard {
    /// 禁用中断并创建守卫
    ///
    /// # Safety
    ///
    /// 守卫必须在创建它的执行上下文中被丢弃；嵌套使用是安全的，
    /// 内层守卫只恢复它自己看到的状态。
    #[inline]
    pub unsafe fn new() -> Self {
        InterruptGuard {
            flags: local_irq_save(),
            _not_send: core::marker::PhantomData,
        }
    }
}

impl Drop for InterruptGuard {
    /// 恢复中断状态
    #[inline]
    fn drop(&mut self) {
        unsafe { local_irq_restore(self.flags) }
    }
}

#[cfg(all(target_os = "none", target_arch = "riscv64"))]
#[inline]
unsafe fn local_irq_save() -> usize {
    let flags: usize;
    // 读取 sstatus 并清除 SIE 位（bit 1）
    asm!("csrrci {}, sstatus, 0x2", out(reg) flags, options(nomem, nostack));
    flags
}

#[cfg(all(target_os = "none", target_arch = "riscv64"))]
#[inline]
unsafe fn local_irq_restore(flags: usize) {
    asm!("csrs sstatus, {}", in(reg) flags & 0x2, options(nomem, nostack));
}

#[cfg(all(target_os = "none", target_arch = "riscv32"))]
#[inline]
unsafe fn local_irq_save() -> usize {
    let flags: usize;
    // 读取 mstatus 并清除 MIE 位（bit 3）
    asm!("csrrci {}, mstatus, 0x8", out(reg) flags, options(nomem, nostack));
    flags
}

#[cfg(all(target_os = "none", target_arch = "riscv32"))]
#[inline]
unsafe fn local_irq_restore(flags: usize) {
    asm!("csrs mstatus, {}", in(reg) flags & 0x8, options(nomem, nostack));
}

#[cfg(not(all(target_os = "none", any(target_arch = "riscv64", target_arch = "riscv32"))))]
#[inline]
unsafe fn local_irq_save() -> usize {
    0
}

#[cfg(not(all(target_os = "none", any(target_arch = "riscv64", target_arch = "riscv32"))))]
#[inline]
unsafe fn local_irq_restore(_flags: usize) {}
