/// BMP 文件的标准头部大小 (字节)。
/// 头部原样复制，不做任何解析；隐写操作从其后的像素数据开始。
pub const BMP_HEADER_SIZE: usize = 54;

/// 每个像素占用的字节数，对应三个颜色分量。
pub const BYTES_PER_PIXEL: usize = 3;

/// 每个隐写块包含的像素数。
/// 隐藏值嵌入的是这 4 个像素的平均值，而非单个像素。
pub const PIXELS_PER_BLOCK: usize = 4;

/// 一个完整隐写块的字节数。
pub const BLOCK_SIZE: usize = PIXELS_PER_BLOCK * BYTES_PER_PIXEL;

/// 记录位深所用的位数。
/// 位深写入第一个像素首分量的低 4 位，提取时据此自校验。
pub const BIT_DEPTH_FIELD_BITS: u8 = 4;

/// 消息终止符序列 (14 字节，固定，不可配置)。
/// 格式中没有显式长度字段，提取以该序列作为唯一的结束判据。
pub const TERMINATOR_SEQUENCE: &[u8] = b"END_OF_MESSAGE";

/// hide 子命令未指定输出路径时使用的缺省文件名。
pub const DEFAULT_HIDE_OUTPUT_FILE: &str = "output_stego.bmp";

/// extract 子命令未指定输出路径时使用的缺省文件名。
pub const DEFAULT_EXTRACT_OUTPUT_FILE: &str = "output_message.txt";
