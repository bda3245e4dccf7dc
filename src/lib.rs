//! # avg_hide 库
//!
//! 本库包含块平均隐写工具的核心逻辑：把任意字节负载嵌入未压缩 24 位 BMP
//! 图像的像素数据中，每个隐藏值分摊到连续 4 个像素的平均值上，以降低可见失真。

// 声明库包含的所有模块。

pub mod bitstream;
pub mod cli;
pub mod constants;
pub mod handler;
pub mod steganography;
