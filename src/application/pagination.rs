//! Page-number strip for the post listing.

use url::form_urlencoded;

/// Pages listed in full up to this many; beyond it the strip is compressed.
pub const MAX_PAGES_SHOWN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EllipsisSide {
    Leading,
    Trailing,
}

/// One slot in the strip. The two ellipsis sides differ only so that each
/// slot has a unique rendering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageItem {
    Page(u32),
    Ellipsis(EllipsisSide),
}

impl PageItem {
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Page(page) => page.to_string(),
            Self::Ellipsis(EllipsisSide::Leading) => "ellipsis-leading".to_string(),
            Self::Ellipsis(EllipsisSide::Trailing) => "ellipsis-trailing".to_string(),
        }
    }
}

/// First page, a window of one page either side of `current`, last page,
/// with ellipses marking the gaps.
#[must_use]
pub fn compute_page_sequence(current: u32, total: u32) -> Vec<PageItem> {
    if total <= MAX_PAGES_SHOWN {
        return (1..=total).map(PageItem::Page).collect();
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total - 1);

    let mut items = vec![PageItem::Page(1)];
    if start > 2 {
        items.push(PageItem::Ellipsis(EllipsisSide::Leading));
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total - 1 {
        items.push(PageItem::Ellipsis(EllipsisSide::Trailing));
    }
    items.push(PageItem::Page(total));
    items
}

/// `base_path?<other params>&page=<page>`; any `page` in `params` is
/// replaced.
#[must_use]
pub fn build_page_url<K, V>(page: u32, base_path: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if key.as_ref() != "page" {
            serializer.append_pair(key.as_ref(), value.as_ref());
        }
    }
    serializer.append_pair("page", &page.to_string());
    format!("{base_path}?{}", serializer.finish())
}

/// `ceil(total_items / page_size)`, never less than one page.
#[must_use]
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total_items.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub item: PageItem,
    /// `None` for ellipsis slots.
    pub href: Option<String>,
    pub is_current: bool,
}

/// Everything needed to render the pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub links: Vec<PageLink>,
}

impl Pagination {
    /// `None` when there is a single page (or none): nothing is rendered.
    #[must_use]
    pub fn build<K, V>(current: u32, total: u32, base_path: &str, params: &[(K, V)]) -> Option<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if total <= 1 {
            return None;
        }

        let previous = (current > 1).then(|| build_page_url(current - 1, base_path, params));
        let next = (current < total).then(|| build_page_url(current + 1, base_path, params));
        let links = compute_page_sequence(current, total)
            .into_iter()
            .map(|item| match item {
                PageItem::Page(page) => PageLink {
                    item,
                    href: Some(build_page_url(page, base_path, params)),
                    is_current: page == current,
                },
                PageItem::Ellipsis(_) => PageLink {
                    item,
                    href: None,
                    is_current: false,
                },
            })
            .collect();

        Some(Self {
            current,
            total,
            previous,
            next,
            links,
        })
    }
}
