use std::io::{self, ErrorKind};

use crate::bitstream::{BitReader, BitWriter};
use crate::constants::{
    BIT_DEPTH_FIELD_BITS, BLOCK_SIZE, BMP_HEADER_SIZE, BYTES_PER_PIXEL, TERMINATOR_SEQUENCE,
};

/// 提取结果：恢复出的负载，以及是否真正读到了终止符。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Extraction {
    pub payload: Vec<u8>,
    /// 为 `false` 表示数据在终止符出现前就耗尽了，负载可能被截断。
    pub terminator_found: bool,
}

/// 两幅图像在同一下标处不一致的字节。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PixelMismatch {
    pub index: usize,
    pub original: u8,
    pub stego: u8,
}

fn low_bits_mask(num_bits: u8) -> u8 {
    ((1u16 << num_bits) - 1) as u8
}

/// 清除 `color` 的低 `num_bits` 位并写入 `value`。
pub fn embed_bits(color: u8, value: u8, num_bits: u8) -> u8 {
    debug_assert!((1..=8).contains(&num_bits));
    // 调用方保证 value 不超出 num_bits 位,否则会污染相邻的颜色位
    debug_assert!(num_bits == 8 || value < (1 << num_bits));

    let mask = low_bits_mask(num_bits);
    (color & !mask) | value
}

/// 取出 `color` 的低 `num_bits` 位。
pub fn extract_bits(color: u8, num_bits: u8) -> u8 {
    debug_assert!((1..=8).contains(&num_bits));

    color & low_bits_mask(num_bits)
}

/// 对给定像素序列逐分量求平均值 (向下取整)。
///
/// `pixels` 的长度必须是 3 的整数倍；完整块为 4 个像素，
/// 末尾的残缺块允许 1 到 3 个像素。
pub fn average_colors(pixels: &[u8]) -> [u8; 3] {
    debug_assert!(!pixels.is_empty() && pixels.len() % BYTES_PER_PIXEL == 0);

    let count = (pixels.len() / BYTES_PER_PIXEL) as u32;
    let mut sums = [0u32; 3];
    for pixel in pixels.chunks_exact(BYTES_PER_PIXEL) {
        for (sum, &component) in sums.iter_mut().zip(pixel) {
            *sum += u32::from(component);
        }
    }
    sums.map(|sum| (sum / count) as u8)
}

/// 把 `values` 嵌入 `avg` 的低位后，调整像素使每个分量的和恰好等于
/// 嵌入后平均值乘以像素数，保证向下取整的再平均能原样还原嵌入值。
pub fn distribute_average(pixels: &mut [u8], avg: [u8; 3], values: [u8; 3], bit_depth: u8) {
    let count = (pixels.len() / BYTES_PER_PIXEL) as i32;
    for channel in 0..BYTES_PER_PIXEL {
        let embedded = embed_bits(avg[channel], values[channel], bit_depth);
        let target = i32::from(embedded) * count;
        let current: i32 = pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|pixel| i32::from(pixel[channel]))
            .sum();
        adjust_channel(pixels, channel, target - current);
    }
}

// 把 diff 尽量均摊到各像素:先加截断后的基数,再给前 diff % n 个像素各加一个
// 单位,最后逐像素消化残差直到分量和与目标完全一致。分量值不做钳制,越界
// 按模 256 回绕。
fn adjust_channel(pixels: &mut [u8], channel: usize, diff: i32) {
    let count = (pixels.len() / BYTES_PER_PIXEL) as i32;
    let mut total_adjustment = 0;
    for (i, pixel) in pixels.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
        let mut adjustment = diff / count;
        if (i as i32) < diff % count {
            adjustment += if diff > 0 { 1 } else { -1 };
        }
        pixel[channel] = (i32::from(pixel[channel]) + adjustment) as u8;
        total_adjustment += adjustment;
    }

    let mut residual = diff - total_adjustment;
    for pixel in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        if residual == 0 {
            break;
        }
        let step = if residual > 0 { 1 } else { -1 };
        pixel[channel] = (i32::from(pixel[channel]) + step) as u8;
        residual -= step;
    }
    debug_assert_eq!(residual, 0);
}

fn validate_bit_depth(bit_depth: u8) -> Result<(), io::Error> {
    if !(1..=4).contains(&bit_depth) {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The bit depth must be between 1 and 4.",
        ));
    }
    Ok(())
}

/// 封面能承载的消息位数上限。
///
/// 每个块 (包括末尾的残缺块) 的三个分量平均值各承载 `bit_depth` 位。
pub fn embeddable_bits(cover_len: usize, bit_depth: u8) -> usize {
    let Some(pixel_bytes) = cover_len.checked_sub(BMP_HEADER_SIZE + BYTES_PER_PIXEL) else {
        return 0;
    };
    let mut blocks = pixel_bytes / BLOCK_SIZE;
    if pixel_bytes % BLOCK_SIZE >= BYTES_PER_PIXEL {
        blocks += 1;
    }
    blocks * 3 * usize::from(bit_depth)
}

/// 把 `payload` 连同终止符嵌入 `cover` 的像素数据，返回完整的隐写图像。
///
/// 封面容量不足时多出的消息位被静默丢弃，输出仍是结构完整的图像。
pub fn hide_data(payload: &[u8], cover: &[u8], bit_depth: u8) -> Result<Vec<u8>, io::Error> {
    validate_bit_depth(bit_depth)?;
    if cover.len() < BMP_HEADER_SIZE + BYTES_PER_PIXEL {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The cover image is too small to hold the bit depth marker.",
        ));
    }

    let mut message = Vec::with_capacity(payload.len() + TERMINATOR_SEQUENCE.len());
    message.extend_from_slice(payload);
    message.extend_from_slice(TERMINATOR_SEQUENCE);

    let mut output = Vec::with_capacity(cover.len());
    output.extend_from_slice(&cover[..BMP_HEADER_SIZE]);

    // 第一个像素的首分量记录位深,提取时据此自校验
    let first_pixel = &cover[BMP_HEADER_SIZE..BMP_HEADER_SIZE + BYTES_PER_PIXEL];
    output.push(embed_bits(first_pixel[0], bit_depth, BIT_DEPTH_FIELD_BITS));
    output.extend_from_slice(&first_pixel[1..]);

    let mut reader = BitReader::new(&message);
    for chunk in cover[BMP_HEADER_SIZE + BYTES_PER_PIXEL..].chunks(BLOCK_SIZE) {
        if !reader.has_bits() {
            output.extend_from_slice(chunk);
            continue;
        }

        let whole = chunk.len() - chunk.len() % BYTES_PER_PIXEL;
        if whole == 0 {
            // 凑不成一个像素的尾随字节,原样复制
            output.extend_from_slice(chunk);
            continue;
        }

        let mut block = [0u8; BLOCK_SIZE];
        let block = &mut block[..whole];
        block.copy_from_slice(&chunk[..whole]);

        let avg = average_colors(block);
        let mut values = [0u8; 3];
        for value in &mut values {
            if !reader.has_bits() {
                break;
            }
            *value = reader.read_bits(bit_depth);
        }
        distribute_average(block, avg, values, bit_depth);

        output.extend_from_slice(block);
        output.extend_from_slice(&chunk[whole..]);
    }

    Ok(output)
}

/// 从隐写图像中恢复隐藏的负载。
///
/// 先核对图像里自记录的位深与 `bit_depth` 是否一致，再逐块对平均值解码，
/// 直到完整字节的末尾出现终止符。数据耗尽仍未出现终止符时返回已解出的
/// 内容并把 [`Extraction::terminator_found`] 置为 `false`。
pub fn extract_data(stego: &[u8], bit_depth: u8) -> Result<Extraction, io::Error> {
    validate_bit_depth(bit_depth)?;
    if stego.len() < BMP_HEADER_SIZE + BYTES_PER_PIXEL {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The stego image is too small to contain hidden data.",
        ));
    }

    // 头部 54 字节不做校验,直接跳过
    let first_pixel = &stego[BMP_HEADER_SIZE..BMP_HEADER_SIZE + BYTES_PER_PIXEL];
    let stored_depth = extract_bits(first_pixel[0], BIT_DEPTH_FIELD_BITS);
    if stored_depth != bit_depth {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The number of bits for extraction does not match the number of bits used for hiding.",
        ));
    }

    let mut writer = BitWriter::new();
    for chunk in stego[BMP_HEADER_SIZE + BYTES_PER_PIXEL..].chunks(BLOCK_SIZE) {
        let whole = chunk.len() - chunk.len() % BYTES_PER_PIXEL;
        if whole == 0 {
            break;
        }

        let avg = average_colors(&chunk[..whole]);
        for channel in 0..3 {
            writer.push_bits(extract_bits(avg[channel], bit_depth), bit_depth);

            // 终止符只会在一个完整字节收尾的瞬间出现,残缺字节不参与比对
            if let Some(end) = payload_end(&writer) {
                let mut payload = writer.into_bytes();
                payload.truncate(end);
                return Ok(Extraction {
                    payload,
                    terminator_found: true,
                });
            }
        }
    }

    Ok(Extraction {
        payload: writer.into_bytes(),
        terminator_found: false,
    })
}

// 已完成的字节若以终止符收尾,返回负载的字节长度。
fn payload_end(writer: &BitWriter) -> Option<usize> {
    let complete = writer.complete_bytes();
    let end = complete.checked_sub(TERMINATOR_SEQUENCE.len())?;
    (&writer.as_bytes()[end..complete] == TERMINATOR_SEQUENCE).then_some(end)
}

/// 逐字节对比两幅等长图像，返回所有不一致的位置。离线诊断用。
pub fn cross_reference(original: &[u8], stego: &[u8]) -> Result<Vec<PixelMismatch>, io::Error> {
    if original.len() != stego.len() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "The two images must be the same size to cross-reference.",
        ));
    }

    Ok(original
        .iter()
        .zip(stego)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(index, (&original, &stego))| PixelMismatch {
            index,
            original,
            stego,
        })
        .collect())
}
