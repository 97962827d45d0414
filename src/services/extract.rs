// src/services/extract.rs

//! Post extractor.
//!
//! Turns listing markup into [`Post`]s using the configured CSS selectors.
//! Malformed rows are skipped; only a missing results table fails the
//! extraction.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Post, SourceConfig, UrlJoin};
use crate::services::listing::RawDocument;
use crate::utils::{naive_join, resolve_url};

/// Minimum number of cells a row needs to become a post.
pub const MIN_CELLS: usize = 6;

/// Parses the results table of a listing page.
#[derive(Debug, Clone)]
pub struct PostExtractor {
    table: Selector,
    row: Selector,
    cell: Selector,
    status: Selector,
    link: Selector,
    endpoint: String,
    join: LinkJoin,
}

#[derive(Debug, Clone)]
enum LinkJoin {
    Naive,
    Resolve(Url),
}

impl PostExtractor {
    /// Compile the selectors of a source configuration.
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let selectors = &source.selectors;
        let join = match source.url_join {
            UrlJoin::Naive => LinkJoin::Naive,
            UrlJoin::Resolve => LinkJoin::Resolve(Url::parse(&source.endpoint_url).map_err(
                |e| AppError::config(format!("endpoint_url is not a valid URL: {e}")),
            )?),
        };

        Ok(Self {
            table: Self::parse_selector(&selectors.table)?,
            row: Self::parse_selector(&selectors.row)?,
            cell: Self::parse_selector(&selectors.cell)?,
            status: Self::parse_selector(&selectors.status)?,
            link: Self::parse_selector(&selectors.link)?,
            endpoint: source.endpoint_url.clone(),
            join,
        })
    }

    /// Extract posts from a fetched document.
    pub fn extract(&self, document: &RawDocument) -> Result<Vec<Post>> {
        self.extract_html(&document.html)
    }

    /// Extract posts from raw markup, in document order.
    pub fn extract_html(&self, html: &str) -> Result<Vec<Post>> {
        let document = Html::parse_document(html);
        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| AppError::parse("results table not found in listing"))?;

        let mut posts = Vec::new();
        let mut skipped = 0usize;
        for row in table.select(&self.row) {
            match self.parse_row(&row) {
                Some(post) => posts.push(post),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} malformed listing row(s)");
        }
        Ok(posts)
    }

    fn parse_row(&self, row: &ElementRef) -> Option<Post> {
        let cells: Vec<ElementRef> = row.select(&self.cell).collect();
        if cells.len() < MIN_CELLS {
            return None;
        }

        let title = cell_text(&cells[2]);
        if title.is_empty() {
            return None;
        }

        let status = row
            .select(&self.status)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string);

        let href = row
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|href| !href.is_empty());

        Some(Post {
            number: cell_text(&cells[0]),
            status,
            title,
            deadline: cell_text(&cells[3]),
            selected_date: cell_text(&cells[4]),
            file: cell_text(&cells[5]),
            url: self.link_for(href),
        })
    }

    fn link_for(&self, href: Option<&str>) -> String {
        match &self.join {
            LinkJoin::Naive => naive_join(&self.endpoint, href),
            LinkJoin::Resolve(base) => match href {
                Some(href) => resolve_url(base, href),
                None => base.to_string(),
            },
        }
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingSelectors;

    const LISTING: &str = r#"
        <html><body>
        <table class="boardList">
          <thead><tr><th>번호</th><th>상태</th><th>제목</th><th>마감</th><th>발표</th><th>파일</th></tr></thead>
          <tbody>
            <tr>
              <td> 128 </td>
              <td><img src="/img/ing.gif" alt="접수중"></td>
              <td><a href="introduction_view.aspx?idx=128">  해외 아트마켓 참가 지원  </a></td>
              <td>2026-11-01</td>
              <td>2026-11-20</td>
              <td> 첨부 </td>
            </tr>
            <tr>
              <td>127</td>
              <td></td>
              <td>링크 없는 공고</td>
              <td>상시</td>
              <td>-</td>
              <td></td>
            </tr>
            <tr><td colspan="6">등록된 게시물이 없습니다.</td></tr>
            <tr>
              <td>126</td><td></td><td>   </td><td>a</td><td>b</td><td>c</td>
            </tr>
          </tbody>
        </table>
        </body></html>
    "#;

    fn extractor() -> PostExtractor {
        PostExtractor::new(&SourceConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_rows_in_order() {
        let posts = extractor().extract_html(LISTING).unwrap();
        assert_eq!(posts.len(), 2);

        let first = &posts[0];
        assert_eq!(first.number, "128");
        assert_eq!(first.status.as_deref(), Some("접수중"));
        assert_eq!(first.title, "해외 아트마켓 참가 지원");
        assert_eq!(first.deadline, "2026-11-01");
        assert_eq!(first.selected_date, "2026-11-20");
        assert_eq!(first.file, "첨부");
        assert_eq!(
            first.url,
            "https://www.gokams.or.kr/02_apply//introduction_view.aspx?idx=128"
        );

        assert_eq!(posts[1].number, "127");
    }

    #[test]
    fn test_row_without_icon_or_link() {
        let posts = extractor().extract_html(LISTING).unwrap();
        let second = &posts[1];
        assert_eq!(second.status, None);
        assert_eq!(second.url, "https://www.gokams.or.kr/02_apply//null");
    }

    #[test]
    fn test_titles_are_trimmed_and_non_empty() {
        let posts = extractor().extract_html(LISTING).unwrap();
        for post in &posts {
            assert!(!post.title.is_empty());
            assert_eq!(post.title, post.title.trim());
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = extractor();
        let first = extractor.extract_html(LISTING).unwrap();
        let second = extractor.extract_html(LISTING).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let html = r#"<table class="boardList"><tbody>
            <tr><td>1</td><td></td><td>Five cells only</td><td>a</td><td>b</td></tr>
            <tr><td>2</td><td></td><td>Six cells</td><td>a</td><td>b</td><td>c</td></tr>
        </tbody></table>"#;
        let posts = extractor().extract_html(html).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Six cells");
    }

    #[test]
    fn test_empty_table_yields_no_posts() {
        let html = r#"<table class="boardList"><tbody></tbody></table>"#;
        assert!(extractor().extract_html(html).unwrap().is_empty());
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let html = "<html><body><p>점검 중입니다</p></body></html>";
        let err = extractor().extract_html(html).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_resolve_mode_builds_absolute_links() {
        let source = SourceConfig {
            url_join: UrlJoin::Resolve,
            ..SourceConfig::default()
        };
        let posts = PostExtractor::new(&source)
            .unwrap()
            .extract_html(LISTING)
            .unwrap();
        assert_eq!(
            posts[0].url,
            "https://www.gokams.or.kr/02_apply/introduction_view.aspx?idx=128"
        );
        assert_eq!(posts[1].url, "https://www.gokams.or.kr/02_apply/");
    }

    #[test]
    fn test_invalid_selector_is_parse_error() {
        let source = SourceConfig {
            selectors: ListingSelectors {
                table: "[[invalid".to_string(),
                ..ListingSelectors::default()
            },
            ..SourceConfig::default()
        };
        assert!(matches!(
            PostExtractor::new(&source),
            Err(AppError::Parse(_))
        ));
    }
}
