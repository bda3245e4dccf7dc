use avg_hide::{
    cli::{CompareArgs, ExtractArgs, HideArgs},
    handler::{handle_compare, handle_extract, handle_hide},
};
use image::{ImageBuffer, Rgb};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(3))
        .for_each(|(pixel, chunk)| {
            // 分量压进中间灰度区间,避免嵌入调整时越界回绕
            *pixel = Rgb([
                64 + chunk[0] % 128,
                64 + chunk[1] % 128,
                64 + chunk[2] % 128,
            ]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 验证从隐藏到提取的完整流程
#[test]
fn test_handle_hide_and_extract_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let stego_path = dir.path().join("stego.bmp");
    let message_path = dir.path().join("message.txt");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_image(&cover_path, 100, 100);
    let original_message = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&message_path, original_message)?;

    // 2. 测试 handle_hide
    let hide_args = HideArgs {
        message: message_path.clone(),
        cover: cover_path.clone(),
        bits: 2,
        output: Some(stego_path.clone()),
        force: false,
    };
    handle_hide(hide_args)?;
    assert!(stego_path.exists(), "Stego image should be created.");

    // 3. 测试 handle_extract
    let extract_args = ExtractArgs {
        stego: stego_path.clone(),
        bits: 2,
        output: Some(recovered_path.clone()),
        force: false,
    };
    handle_extract(extract_args)?;
    assert!(
        recovered_path.exists(),
        "Recovered message file should be created."
    );

    // 4. 验证结果
    let recovered = fs::read(&recovered_path)?;
    assert_eq!(
        recovered,
        original_message.as_bytes(),
        "Recovered message must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确使用缺省文件名并完成操作
#[test]
fn test_default_output_filenames() -> anyhow::Result<()> {
    // 1. 准备环境,切入临时目录让缺省的相对路径落在里面
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let message_path = dir.path().join("message.txt");

    create_test_image(&cover_path, 60, 60);
    fs::write(&message_path, "default path check")?;
    std::env::set_current_dir(dir.path())?;

    // 2. 测试 handle_hide,不提供 output 路径
    let hide_args = HideArgs {
        message: message_path.clone(),
        cover: cover_path.clone(),
        bits: 2,
        output: None, // 关键：测试 None 的情况
        force: false,
    };
    handle_hide(hide_args)?;

    let default_stego = dir.path().join("output_stego.bmp");
    assert!(
        default_stego.exists(),
        "Default stego image should be created at: {:?}",
        default_stego
    );

    // 3. 测试 handle_extract,不提供 output 路径
    let extract_args = ExtractArgs {
        stego: default_stego,
        bits: 2,
        output: None, // 关键：测试 None 的情况
        force: false,
    };
    handle_extract(extract_args)?;

    let default_message = dir.path().join("output_message.txt");
    assert!(
        default_message.exists(),
        "Default message file should be created at: {:?}",
        default_message
    );

    // 4. 验证结果
    let recovered = fs::read(&default_message)?;
    assert_eq!(
        recovered, b"default path check",
        "Recovered message from default file must match the original."
    );

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let message_path = dir.path().join("message.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&cover_path, 48, 48);
    fs::write(&message_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    // 构建参数，不使用 --force
    let hide_args_no_force = HideArgs {
        message: message_path.clone(),
        cover: cover_path.clone(),
        bits: 1,
        output: Some(dest_path.clone()),
        force: false,
    };

    // 执行并断言操作会失败
    let result = handle_hide(hide_args_no_force);
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    // 构建参数，这次使用 --force
    let hide_args_with_force = HideArgs {
        message: message_path.clone(),
        cover: cover_path.clone(),
        bits: 1,
        output: Some(dest_path.clone()),
        force: true,
    };

    // 执行并断言操作会成功
    let result = handle_hide(hide_args_with_force);
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证位深不匹配时提取失败，且不会留下输出文件
#[test]
fn test_extract_bit_depth_mismatch_leaves_no_output() -> anyhow::Result<()> {
    // 1. 准备环境：先用位深 2 隐藏
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let message_path = dir.path().join("message.txt");
    let stego_path = dir.path().join("stego.bmp");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_image(&cover_path, 48, 48);
    fs::write(&message_path, "mismatch me")?;

    handle_hide(HideArgs {
        message: message_path,
        cover: cover_path,
        bits: 2,
        output: Some(stego_path.clone()),
        force: false,
    })?;

    // 2. 用位深 4 提取,断言错误与输出文件缺席
    let result = handle_extract(ExtractArgs {
        stego: stego_path,
        bits: 4,
        output: Some(recovered_path.clone()),
        force: false,
    });

    assert!(result.is_err(), "Mismatched bit depth should fail.");
    if let Err(e) = result {
        assert!(
            format!("{:#}", e).contains("does not match"),
            "The error chain should name the mismatch."
        );
    }
    assert!(
        !recovered_path.exists(),
        "No output file should be created on failure."
    );

    Ok(())
}

/// 验证容量不足时隐藏不报错，提取仍能得到截断的内容
#[test]
fn test_truncated_hide_is_not_an_error() -> anyhow::Result<()> {
    // 1. 准备环境：很小的封面配很大的消息
    let dir = tempdir()?;
    let cover_path = dir.path().join("small.bmp");
    let message_path = dir.path().join("large.txt");
    let stego_path = dir.path().join("stego.bmp");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_image(&cover_path, 12, 12);
    let large_message = "a".repeat(5000);
    fs::write(&message_path, &large_message)?;

    // 2. 隐藏必须成功:容量不足是截断策略,不是错误
    handle_hide(HideArgs {
        message: message_path,
        cover: cover_path,
        bits: 1,
        output: Some(stego_path.clone()),
        force: false,
    })?;
    assert!(stego_path.exists());

    // 3. 提取同样成功,得到的是截断的前缀
    handle_extract(ExtractArgs {
        stego: stego_path,
        bits: 1,
        output: Some(recovered_path.clone()),
        force: false,
    })?;

    let recovered = fs::read(&recovered_path)?;
    assert!(
        recovered.len() < large_message.len(),
        "Recovered data must be a truncated prefix."
    );
    assert!(
        large_message.as_bytes().starts_with(&recovered[..recovered.len().min(8)]),
        "Recovered data must be a prefix of the original message."
    );

    Ok(())
}

/// 验证 compare 子命令对隐写前后的图像给出差异报告
#[test]
fn test_handle_compare_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let cover_path = dir.path().join("cover.bmp");
    let message_path = dir.path().join("message.txt");
    let stego_path = dir.path().join("stego.bmp");

    create_test_image(&cover_path, 48, 48);
    fs::write(&message_path, "compare me")?;

    handle_hide(HideArgs {
        message: message_path,
        cover: cover_path.clone(),
        bits: 2,
        output: Some(stego_path.clone()),
        force: false,
    })?;

    // 2. 隐写前后对比与自我对比都应成功
    handle_compare(CompareArgs {
        original: cover_path.clone(),
        stego: stego_path,
    })?;
    handle_compare(CompareArgs {
        original: cover_path.clone(),
        stego: cover_path,
    })?;

    Ok(())
}
