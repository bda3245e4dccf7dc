//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`extract` 和 `compare` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{CompareArgs, ExtractArgs, HideArgs};
use crate::constants::{DEFAULT_EXTRACT_OUTPUT_FILE, DEFAULT_HIDE_OUTPUT_FILE, TERMINATOR_SEQUENCE};
use crate::steganography::{cross_reference, embeddable_bits, extract_data, hide_data};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 覆盖保护：目标文件已存在且未指定 `--force` 时拒绝写入。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取消息文件与封面图像、解析输出路径与覆盖保护、
/// 调用核心隐藏函数，最后将隐写图像写入目标文件。
/// 封面容量不足不构成错误：多出的消息位会被静默丢弃，此处仅提前告警。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、位深与覆盖开关的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取消息文件或封面图像。
/// * 输出文件已存在且未指定 `--force`。
/// * 核心隐藏函数 (`hide_data`) 在执行过程中失败。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let message = fs::read(&args.message).with_context(|| {
        format!(
            "Unable to read message file: {}",
            args.message.to_string_lossy().red().bold()
        )
    })?;

    let cover = fs::read(&args.cover).with_context(|| {
        format!(
            "Unable to read cover image: {}",
            args.cover.to_string_lossy().red().bold()
        )
    })?;

    let dest = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HIDE_OUTPUT_FILE));
    ensure_writable(&dest, args.force)?;

    let required_bits = (message.len() + TERMINATOR_SEQUENCE.len()) * 8;
    let available_bits = embeddable_bits(cover.len(), args.bits);
    if required_bits > available_bits {
        println!(
            "{} the cover image can hold {} of the {} message bits; the hidden data will be truncated.",
            "warning:".yellow().bold(),
            available_bits.to_string().yellow(),
            required_bits.to_string().yellow()
        );
    }

    let stego = hide_data(&message, &cover, args.bits).with_context(|| {
        format!(
            "Failed to hide the message in: {}",
            args.cover.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&dest, stego).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The message has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Extract' 命令的执行逻辑。
///
/// 负责读取隐写图像、核对位深、调用核心提取函数，
/// 最后将恢复的消息内容写入目标文件。
/// 位深不匹配时在创建任何输出文件之前即失败；
/// 数据耗尽仍未读到终止符时告警，但仍写出已恢复的内容。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、位深与覆盖开关的 `ExtractArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取隐写图像。
/// * 输出文件已存在且未指定 `--force`。
/// * 提供的位深与图像中记录的位深不一致。
/// * 无法写入到目标消息文件。
pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    let stego = fs::read(&args.stego).with_context(|| {
        format!(
            "Unable to read stego image: {}",
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    let dest = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXTRACT_OUTPUT_FILE));
    ensure_writable(&dest, args.force)?;

    let extraction = extract_data(&stego, args.bits).with_context(|| {
        format!(
            "Failed to extract a message from '{}'. \nThe image may not contain a hidden message or was hidden with a different bit depth.",
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    if !extraction.terminator_found {
        println!(
            "{} the terminator sequence never appeared; the recovered message is probably truncated.",
            "warning:".yellow().bold()
        );
    }

    fs::write(&dest, &extraction.payload).with_context(|| {
        format!(
            "Unable to write to target message file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The message has been successfully extracted and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Compare' 命令的执行逻辑。
///
/// 读取两幅等长图像并逐字节对比，打印所有不一致的位置。
/// 仅作离线诊断，不影响隐藏/提取流程。
///
/// # Arguments
///
/// * `args` - 包含两个图像路径的 `CompareArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取任一图像文件。
/// * 两幅图像的大小不一致。
pub fn handle_compare(args: CompareArgs) -> Result<()> {
    let original = fs::read(&args.original).with_context(|| {
        format!(
            "Unable to read original image: {}",
            args.original.to_string_lossy().red().bold()
        )
    })?;

    let stego = fs::read(&args.stego).with_context(|| {
        format!(
            "Unable to read stego image: {}",
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    let mismatches = cross_reference(&original, &stego).with_context(|| {
        format!(
            "Failed to cross-reference '{}' against '{}'.",
            args.original.to_string_lossy().red().bold(),
            args.stego.to_string_lossy().red().bold()
        )
    })?;

    if mismatches.is_empty() {
        println!("The two images are byte-for-byte identical.");
        return Ok(());
    }

    for mismatch in &mismatches {
        println!(
            "Byte mismatch at index {}: original = {}, stego = {}",
            mismatch.index, mismatch.original, mismatch.stego
        );
    }
    println!(
        "Found {} differing bytes.",
        mismatches.len().to_string().green().bold()
    );

    Ok(())
}
