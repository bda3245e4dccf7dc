//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 一款基于块平均隐写术的命令行工具，用于在未压缩 24 位 BMP 图像中隐藏或提取任意字节数据。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    subcommand_required = true,
    arg_required_else_help = true,
    long_about = "一款基于块平均隐写术的命令行工具：把消息位嵌入连续 4 个像素的颜色平均值，\
                  再调整各像素使平均值精确保留，用于在未压缩 24 位 BMP 图像中隐藏或提取任意字节数据。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、extract (提取) 和 compare (对比)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 把消息文件隐藏进 24 位 BMP 封面图像。
    Hide(HideArgs),

    /// 从隐写图像中提取隐藏的消息。
    Extract(ExtractArgs),

    /// 逐字节对比原图与隐写图像，定位被修改的位置。
    Compare(CompareArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 要隐藏的消息文件路径。
    #[arg(short, long)]
    pub message: PathBuf,

    /// 作为封面的未压缩 24 位 BMP 图像路径。
    #[arg(short, long)]
    pub cover: PathBuf,

    /// 每个颜色分量嵌入的位数 (1-4)。
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub bits: u8,

    /// 隐写完成后保存结果图像的输出路径，缺省为 output_stego.bmp。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'extract' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// 已隐藏消息的 BMP 图像路径。
    #[arg(short, long)]
    pub stego: PathBuf,

    /// 隐藏时每个颜色分量使用的位数 (1-4)，必须与隐藏时一致。
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub bits: u8,

    /// 提取后保存消息内容的输出路径，缺省为 output_message.txt。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'compare' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// 原始封面图像路径。
    #[arg(short, long)]
    pub original: PathBuf,

    /// 隐写图像路径。
    #[arg(short, long)]
    pub stego: PathBuf,
}
