/// 头像地址的渲染规则。
///
/// 绝对 http(s) 地址原样返回；需要外部可访问地址时拼接基础地址，否则返回站内相对路径。
#[derive(Debug, Clone, Default)]
pub struct AvatarUrlPolicy {
    base_url: Option<String>,
    external_origin_required: bool,
}

impl AvatarUrlPolicy {
    pub fn new(base_url: Option<String>, external_origin_required: bool) -> Self {
        Self {
            base_url: base_url.map(|url| url.trim_end_matches('/').to_owned()),
            external_origin_required,
        }
    }

    pub fn render(&self, avatar: Option<&str>) -> Option<String> {
        let reference = avatar.map(str::trim).filter(|value| !value.is_empty())?;
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Some(reference.to_owned());
        }

        let path = reference.trim_start_matches('/');
        match (&self.base_url, self.external_origin_required) {
            (Some(base), true) => Some(format!("{base}/{path}")),
            _ => Some(format!("/{path}")),
        }
    }
}
