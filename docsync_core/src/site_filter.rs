use std::ops::Range;

use crate::parser::Directive;
use crate::parser::DirectiveKind;
use crate::parser::SiteRule;
use crate::parser::scan_directives;

/// Result of running the site filter over a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFilterOutcome {
	/// The filtered text.
	pub content: String,
	/// Blocks whose body was kept.
	pub kept: usize,
	/// Blocks that were removed entirely.
	pub removed: usize,
}

/// Evaluate every `@site`/`@endsite` block in `content` for `site`.
///
/// Kept blocks are replaced by their body, removed blocks by nothing. The
/// markers disappear in both cases and everything outside a block is copied
/// through untouched.
pub fn filter_by_site(content: &str, site: &str) -> String {
	filter_by_site_with_outcome(content, site).content
}

/// Like [`filter_by_site`] but also reports how many blocks were kept and
/// removed.
pub fn filter_by_site_with_outcome(content: &str, site: &str) -> SiteFilterOutcome {
	let directives = scan_directives(content);
	let blocks = pair_site_blocks(&directives);
	let mut output = String::with_capacity(content.len());
	let mut last = 0;
	let mut kept = 0;
	let mut removed = 0;

	for block in &blocks {
		output.push_str(&content[last..block.outer.start]);

		if is_site_visible(block.rules, site) {
			output.push_str(&content[block.body.clone()]);
			kept += 1;
		} else {
			removed += 1;
		}

		last = block.outer.end;
	}

	output.push_str(&content[last..]);

	SiteFilterOutcome {
		content: output,
		kept,
		removed,
	}
}

/// Decide whether a block with `rules` is visible for `site`.
///
/// Any `!`-prefixed rule turns the whole list into an exclusion list: the
/// block stays unless `!site` is present. Otherwise the block stays only when
/// `site` is listed. Mixed lists are treated as exclusion lists.
pub fn is_site_visible(rules: &[SiteRule], site: &str) -> bool {
	if rules.iter().any(SiteRule::is_exclusion) {
		return !rules
			.iter()
			.any(|rule| rule.is_exclusion() && rule.site() == site);
	}

	rules
		.iter()
		.any(|rule| !rule.is_exclusion() && rule.site() == site)
}

struct SiteBlock<'a> {
	rules: &'a [SiteRule],
	/// From the opening `<!--` through the closing `-->`.
	outer: Range<usize>,
	/// Between the two markers.
	body: Range<usize>,
}

/// Blocks do not nest: an `@endsite` closes the nearest preceding open
/// `@site`, and any earlier unclosed `@site` stays as literal text.
fn pair_site_blocks(directives: &[Directive]) -> Vec<SiteBlock<'_>> {
	let mut blocks = vec![];
	let mut open: Option<(&[SiteRule], &Directive)> = None;

	for directive in directives {
		match &directive.kind {
			DirectiveKind::Site { rules } => open = Some((rules.as_slice(), directive)),
			DirectiveKind::EndSite => {
				if let Some((rules, opening)) = open.take() {
					blocks.push(SiteBlock {
						rules,
						outer: opening.span.start..directive.span.end,
						body: opening.span.end..directive.span.start,
					});
				}
			}
			DirectiveKind::Include { .. } => {}
		}
	}

	blocks
}
