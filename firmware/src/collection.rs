//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 简单的集合类型实现
//! 不依赖分配器：容量在编译期固定

/// 固定容量的环形 FIFO
///
/// 套接字接收队列、任务消息队列和回环设备的待处理队列都基于它。
/// 所有操作都是常数时间，可以放在屏蔽中断的临界区内。
pub struct FixedRing<T: Copy, const N: usize> {
    buf: [Option<T>; N],
    head: usize,
    len: usize,
}

impl<T: Copy, const N: usize> FixedRing<T, N> {
    /// 创建一个空队列
    pub const fn new() -> Self {
        Self {
            buf: [None; N],
            head: 0,
            len: 0,
        }
    }

    /// 尾部追加；队列已满时把元素原样退回
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.len == N {
            return Err(value);
        }
        let tail = (self.head + self.len) % N;
        self.buf[tail] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// 头部弹出
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.buf[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        value
    }

    /// 查看头部元素
    pub fn peek(&self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.buf[self.head]
        }
    }

    /// 清空队列（不做任何释放动作）
    pub fn clear(&mut self) {
        self.buf = [None; N];
        self.head = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// 从头到尾遍历
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(move |i| self.buf[(self.head + i) % N])
    }
}

impl<T: Copy, const N: usize> Default for FixedRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
