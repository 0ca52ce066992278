//! 固定容量的环形缓冲区
//!
//! 超出容量时淘汰最早写入的元素（FIFO）。

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// 创建容量为 `capacity` 的缓冲区（容量至少为 1）
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加元素，缓冲区已满时返回被淘汰的最旧元素
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// 最近的 `count` 个元素，按写入顺序排列
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &T> {
        let skip = self.items.len().saturating_sub(count);
        self.items.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn recent_vec(&self, count: usize) -> Vec<T> {
        self.recent(count).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut ring = RingBuffer::new(3);
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.to_vec(), vec![2, 3, 4]);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut ring = RingBuffer::new(200);
        for i in 0..201 {
            ring.push(i);
        }
        assert_eq!(ring.len(), 200);
        assert_eq!(ring.iter().next(), Some(&1));
        assert_eq!(ring.iter().last(), Some(&200));
    }

    #[test]
    fn test_recent() {
        let mut ring = RingBuffer::new(10);
        for i in 0..5 {
            ring.push(i);
        }
        assert_eq!(ring.recent_vec(2), vec![3, 4]);
        assert_eq!(ring.recent_vec(20), vec![0, 1, 2, 3, 4]);
        assert!(ring.recent_vec(0).is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut ring = RingBuffer::new(0);
        assert_eq!(ring.capacity(), 1);
        ring.push("a");
        assert_eq!(ring.push("b"), Some("a"));
    }

    #[test]
    fn test_clear() {
        let mut ring = RingBuffer::new(2);
        ring.push(1);
        ring.clear();
        assert!(ring.is_empty());
    }
}
