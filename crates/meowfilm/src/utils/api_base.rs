use url::Url;

/// 粘贴接口地址时常见的配置页后缀
const CONFIG_PAGE_SUFFIXES: [&str; 3] = ["/full-config", "/config", "/website"];

/// 规范化用户填写的 CatPawOpen 服务地址，得到以 `/` 结尾的服务根地址。
///
/// 仅接受 http/https；会去掉查询串与片段，并裁掉误粘贴的 `/spider/...` 接口路径
/// 以及 `/spider`、`/full-config`、`/config`、`/website` 后缀。无法解析时返回 `None`。
pub fn normalize_api_base(input: &str) -> Option<String> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }
    let mut url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let mut path = url.path().to_string();
    if let Some(idx) = path.find("/spider/") {
        path.truncate(idx);
    }
    let mut path = path.trim_end_matches('/').to_string();
    if let Some(stripped) = path.strip_suffix("/spider") {
        path = stripped.trim_end_matches('/').to_string();
    }
    for suffix in CONFIG_PAGE_SUFFIXES {
        if let Some(stripped) = path.strip_suffix(suffix) {
            path = stripped.trim_end_matches('/').to_string();
        }
    }
    path.push('/');

    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}
