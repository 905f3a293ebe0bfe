//! 映像ストリームの受信
//!
//! `multipart/x-mixed-replace` 応答をフレーム単位に分割して読み進める。
//! 再接続はしない。

use crate::client::BackendClient;
use crate::error::{LiveDetectError, Result};
use futures::StreamExt;
use live_detect_common::{boundary_from_content_type, Frame, MjpegSplitter, DEFAULT_BOUNDARY};
use reqwest::header::CONTENT_TYPE;
use std::io::Cursor;

#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    pub width: u32,
    pub height: u32,
    /// この枚数を受け取ったら終了（Noneなら切断まで）
    pub frame_limit: Option<usize>,
}

pub struct StreamViewer {
    client: BackendClient,
    options: StreamOptions,
}

impl StreamViewer {
    pub fn new(client: BackendClient, options: StreamOptions) -> Self {
        Self { client, options }
    }

    /// ストリームを読み、フレームごとに `on_frame(index, frame)` を呼ぶ
    ///
    /// # Returns
    /// 受け取ったフレーム数
    ///
    /// 最初のフレームより前の切断・非2xx・通信エラーは `Err`。
    /// 1枚以上受け取った後の正常終了は `Ok`。
    pub async fn run<F>(&self, mut on_frame: F) -> Result<usize>
    where
        F: FnMut(usize, &Frame),
    {
        if self.options.frame_limit == Some(0) {
            return Ok(0);
        }

        let response = self
            .client
            .open_stream(self.options.width, self.options.height)
            .await?;

        let boundary = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(boundary_from_content_type)
            .unwrap_or(DEFAULT_BOUNDARY)
            .to_string();
        tracing::debug!("stream boundary: {}", boundary);

        let mut splitter = MjpegSplitter::new(&boundary);
        let mut body = response.bytes_stream();
        let mut count = 0usize;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for frame in splitter.push(&chunk)? {
                on_frame(count, &frame);
                count += 1;
                if self.options.frame_limit.is_some_and(|limit| count >= limit) {
                    return Ok(count);
                }
            }
        }

        // 終端境界なしで閉じた場合の最後の1枚
        if let Some(frame) = splitter.finish() {
            on_frame(count, &frame);
            count += 1;
        }

        if count == 0 {
            return Err(LiveDetectError::StreamClosed);
        }
        tracing::info!("映像ストリームが終了しました（{}フレーム）", count);
        Ok(count)
    }
}

/// フレームの画像サイズ（デコードできなければNone）
pub fn frame_dimensions(frame: &Frame) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(&frame.data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
