//! MJPEG（multipart/x-mixed-replace）のフレーム分割
//!
//! バックエンドは次の形式でフレームを送ってくる:
//!
//! ```text
//! --frame\r\n
//! Content-Type: image/jpeg\r\n
//! \r\n
//! <JPEG bytes>\r\n
//! --frame\r\n
//! ...
//! ```
//!
//! 受信チャンクの区切りはフレーム境界と無関係なので、
//! `MjpegSplitter` は内部にバッファを持ち、完成したフレームだけを返す。

use crate::error::{Error, Result};

/// バックエンドが使う既定の境界文字列
pub const DEFAULT_BOUNDARY: &str = "frame";

const MAX_HEADER_BYTES: usize = 8 * 1024;
const MAX_FRAME_BYTES: usize = 32 * 1024 * 1024;

/// 1フレーム分のパート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Content-Typeヘッダーから境界文字列を取り出す
///
/// # Examples
/// ```
/// use live_detect_common::mjpeg::boundary_from_content_type;
///
/// let boundary = boundary_from_content_type("multipart/x-mixed-replace; boundary=frame");
/// assert_eq!(boundary, Some("frame"));
/// ```
pub fn boundary_from_content_type(content_type: &str) -> Option<&str> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim();
    if !mime.to_ascii_lowercase().starts_with("multipart/") {
        return None;
    }
    params
        .filter_map(|p| p.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .map(|value| value.strip_prefix("--").unwrap_or(value))
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
enum Phase {
    /// 次の境界を探している
    Preamble,
    /// 境界の直後。パートヘッダーを読んでいる
    Headers,
    /// 本文を読んでいる
    Body {
        content_type: Option<String>,
        content_length: Option<usize>,
        scanned: usize,
    },
    /// 終端境界（`--frame--`）を受け取ったか、接続が閉じた
    Finished,
}

#[derive(Debug)]
pub struct MjpegSplitter {
    delimiter: Vec<u8>,
    body_end: Vec<u8>,
    buf: Vec<u8>,
    phase: Phase,
}

impl MjpegSplitter {
    pub fn new(boundary: &str) -> Self {
        let delimiter = format!("--{}", boundary).into_bytes();
        let body_end = [b"\r\n".as_slice(), delimiter.as_slice()].concat();
        Self {
            delimiter,
            body_end,
            buf: Vec::new(),
            phase: Phase::Preamble,
        }
    }

    /// 終端境界まで読み終えたか
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// 受信したチャンクを追加し、完成したフレームを返す
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        if self.is_finished() {
            return Ok(Vec::new());
        }
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(frame) = self.step()? {
            if let Some(frame) = frame {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// 接続が閉じたときに呼ぶ
    ///
    /// 本文の途中で切れた場合、次の境界を待たずにそこまでをフレームとして返す。
    /// `Content-Length` 付きで長さが足りないパートは捨てる。
    pub fn finish(&mut self) -> Option<Frame> {
        let phase = std::mem::replace(&mut self.phase, Phase::Finished);
        let mut data = std::mem::take(&mut self.buf);
        match phase {
            Phase::Body {
                content_type,
                content_length: None,
                ..
            } => {
                if data.ends_with(b"\r\n") {
                    data.truncate(data.len() - 2);
                }
                (!data.is_empty()).then_some(Frame { content_type, data })
            }
            _ => None,
        }
    }

    /// 状態を1つ進める
    ///
    /// `Ok(None)` はデータ不足、`Ok(Some(None))` はフレームなしで前進。
    fn step(&mut self) -> Result<Option<Option<Frame>>> {
        match &mut self.phase {
            Phase::Preamble => match find(&self.buf, &self.delimiter, 0) {
                Some(pos) => {
                    self.buf.drain(..pos + self.delimiter.len());
                    self.phase = Phase::Headers;
                    Ok(Some(None))
                }
                None => {
                    // 境界が途中で切れている可能性があるので末尾だけ残す
                    let keep = self.delimiter.len().saturating_sub(1);
                    if self.buf.len() > keep {
                        let cut = self.buf.len() - keep;
                        self.buf.drain(..cut);
                    }
                    Ok(None)
                }
            },
            Phase::Headers => {
                if self.buf.len() < 2 {
                    return Ok(None);
                }
                if self.buf.starts_with(b"--") {
                    self.buf.clear();
                    self.phase = Phase::Finished;
                    return Ok(None);
                }
                let Some(end) = find(&self.buf, b"\r\n\r\n", 0) else {
                    if self.buf.len() > MAX_HEADER_BYTES {
                        return Err(Error::Stream("パートヘッダーが大きすぎます".into()));
                    }
                    return Ok(None);
                };
                let (content_type, content_length) = parse_part_headers(&self.buf[..end])?;
                self.buf.drain(..end + 4);
                self.phase = Phase::Body {
                    content_type,
                    content_length,
                    scanned: 0,
                };
                Ok(Some(None))
            }
            Phase::Body {
                content_type,
                content_length,
                scanned,
            } => {
                let len = match *content_length {
                    Some(len) if self.buf.len() >= len => len,
                    Some(_) => return Ok(None),
                    None => match find(&self.buf, &self.body_end, *scanned) {
                        Some(pos) => pos,
                        None => {
                            if self.buf.len() > MAX_FRAME_BYTES {
                                return Err(Error::Stream("フレームが大きすぎます".into()));
                            }
                            *scanned = self.buf.len().saturating_sub(self.body_end.len() - 1);
                            return Ok(None);
                        }
                    },
                };
                let frame = Frame {
                    content_type: content_type.take(),
                    data: self.buf.drain(..len).collect(),
                };
                self.phase = Phase::Preamble;
                Ok(Some(Some(frame)))
            }
            Phase::Finished => Ok(None),
        }
    }
}

fn parse_part_headers(block: &[u8]) -> Result<(Option<String>, Option<usize>)> {
    let text = std::str::from_utf8(block)
        .map_err(|_| Error::Stream("パートヘッダーがUTF-8ではありません".into()))?;

    let mut content_type = None;
    let mut content_length = None;
    for line in text.split("\r\n").filter(|l| !l.trim().is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::Stream(format!("不正なパートヘッダー: {}", line)));
        };
        let value = value.trim();
        if name.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.to_string());
        } else if name.trim().eq_ignore_ascii_case("content-length") {
            let len = value
                .parse::<usize>()
                .map_err(|_| Error::Stream(format!("不正なContent-Length: {}", value)))?;
            if len > MAX_FRAME_BYTES {
                return Err(Error::Stream("フレームが大きすぎます".into()));
            }
            content_length = Some(len);
        }
    }
    Ok((content_type, content_length))
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}
