//! # MSB 优先位流模块
//!
//! 消息在像素块间的装配与还原都以位为单位进行：隐藏时按位深逐段取出消息位，
//! 提取时再把零散的位段拼回字节。本模块提供顺序读写两侧的游标，
//! 每个字节内部先写/先读最高位。

/// 顺序位读取器。
///
/// 对一个字节切片按 MSB 优先的顺序逐段读取，段宽 1 到 8 位，允许跨越字节边界。
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// 当前读取位置 (已消费的位数)。
    #[inline]
    pub fn position(&self) -> usize {
        self.bit_pos
    }

    /// 剩余可读的位数。
    #[inline]
    pub fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// 是否还有未消费的位。
    #[inline]
    pub fn has_bits(&self) -> bool {
        self.remaining() > 0
    }

    /// 读取接下来的 `count` 位 (1-8)，右对齐返回。
    ///
    /// 剩余位数不足 `count` 时，取完剩余的位并在低位补零；
    /// 这让末尾不足一段的消息位也有确定的嵌入值。
    pub fn read_bits(&mut self, count: u8) -> u8 {
        debug_assert!((1..=8).contains(&count));

        let mut value = 0u8;
        let mut taken = 0u8;
        while taken < count && self.bit_pos < self.data.len() * 8 {
            let byte_index = self.bit_pos / 8;
            let bit_offset = self.bit_pos % 8;
            let bit = (self.data[byte_index] >> (7 - bit_offset)) & 1;
            value = (value << 1) | bit;
            self.bit_pos += 1;
            taken += 1;
        }
        (u16::from(value) << (count - taken)) as u8
    }
}

/// 顺序位写入器。
///
/// 把右对齐的位段按 MSB 优先的顺序追加进一个按需增长的字节缓冲区。
/// 末尾未写满的字节低位为零。
#[derive(Clone, Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入的总位数。
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// 已完整写满的字节数，不含末尾的残缺字节。
    #[inline]
    pub fn complete_bytes(&self) -> usize {
        self.bit_len / 8
    }

    /// 追加 `value` 的低 `count` 位 (1-8)。
    pub fn push_bits(&mut self, value: u8, count: u8) {
        debug_assert!((1..=8).contains(&count));
        debug_assert!(count == 8 || value < (1 << count));

        for i in (0..count).rev() {
            if self.bit_len % 8 == 0 {
                self.data.push(0);
            }
            let bit = (value >> i) & 1;
            let byte_index = self.bit_len / 8;
            let bit_offset = self.bit_len % 8;
            self.data[byte_index] |= bit << (7 - bit_offset);
            self.bit_len += 1;
        }
    }

    /// 到目前为止写入的所有字节，含末尾残缺字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 取出缓冲区，消耗写入器。
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
