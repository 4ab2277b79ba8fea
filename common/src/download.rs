//! バイナリダウンロードのファイル名解決

/// `content-disposition` ヘッダからファイル名を取り出す
///
/// `filename*=UTF-8''...` を優先し、なければ `filename="..."`。
/// パス区切りは除去する。取れなければ `fallback`。
pub fn filename_from_content_disposition(header: Option<&str>, fallback: &str) -> String {
    let Some(header) = header else {
        return fallback.to_string();
    };

    let mut plain: Option<String> = None;
    let mut extended: Option<String> = None;

    for part in header.split(';') {
        let part = part.trim();
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let value = value.trim().trim_matches('"');
                // charset'lang'encoded
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                let decoded = urlencoding::decode_binary(encoded.as_bytes());
                extended = Some(String::from_utf8_lossy(&decoded).into_owned());
            }
            "filename" => {
                plain = Some(value.trim().trim_matches('"').to_string());
            }
            _ => {}
        }
    }

    extended
        .or(plain)
        .map(|name| sanitize(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// データセットエクスポートのフォールバック名
pub fn export_fallback_filename(dataset_id: i64, format: &str) -> String {
    format!("dataset_{}.{}", dataset_id, format)
}

/// ジョブ出力のフォールバック名
pub fn job_fallback_filename(job_id: &str, format: &str) -> String {
    format!("companies_{}.{}", job_id, format)
}

fn sanitize(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or("").trim().to_string()
}
