//! Materializes a [`ContentDecision`] into concrete files. Every variant
//! produces the root landing page; a placement additionally produces a
//! redirect-tracking page under `redirect/` whose filename derives from the
//! sponsor's label. All documents are rendered fully in memory before the
//! first write, so an aborted run never leaves a half-written page behind.
//!
//! Templates are looked up by fixed name in the template directory and
//! carry fixed anchor tokens (see the `*_TOKEN` constants). The
//! advertiser-link token is a literal path string used purely as a
//! substitution anchor; template authors keep their markup previewable by
//! pointing it at a placeholder page.

use crate::render::render;
use crate::select::ContentDecision;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Anchor replaced with the sponsor banner text (or the cause-campaign
/// heading).
pub const BANNER_TOKEN: &str = "SPONSOR_BANNER";

/// Anchor replaced with the outbound link path (`redirect/...` for
/// placements, `causes/...` for cause pages).
pub const LINK_TOKEN: &str = "sponsor/outbound.html";

/// Anchor replaced with the attribution name.
pub const ATTRIBUTION_TOKEN: &str = "SPONSOR_NAME";

/// Anchor in the redirect template replaced with the outbound destination
/// URL.
pub const DESTINATION_TOKEN: &str = "DESTINATION_URL";

/// The heading shown over every cause page link.
pub const CAUSE_BANNER: &str = "Support purple causes";

const SPONSOR_IMAGE_TEMPLATE: &str = "sponsor-image.html";
const SPONSOR_TEXT_TEMPLATE: &str = "sponsor-text.html";
const CAUSE_TEMPLATE: &str = "cause.html";
const PROMOTION_TEMPLATE: &str = "promotion.html";
const DEFAULT_TEMPLATE: &str = "default.html";
const REDIRECT_TEMPLATE: &str = "redirect.html";

const LANDING_PAGE: &str = "index.html";
const REDIRECT_DIRECTORY: &str = "redirect";
const CAUSES_DIRECTORY: &str = "causes";

/// Derives the redirect page's filename from a placement label: spaces
/// become `-` and the `.html` suffix is appended, so `"Foo Bar"` maps to
/// `Foo-Bar.html`. Distinct labels map to distinct filenames.
pub fn redirect_file_name(label: &str) -> String {
    format!("{}.html", label.replace(' ', "-"))
}

fn sponsor_banner(label: &str) -> String {
    format!("Today this page is brought to you by {}", label)
}

/// Writes rendered documents to their destination paths.
pub struct Publisher<'a> {
    /// The directory holding the fixed-name page templates.
    pub template_directory: &'a Path,

    /// The directory holding sponsor image assets, each named exactly after
    /// its placement label. Presence of an asset selects the image-ad
    /// template variant.
    pub asset_directory: &'a Path,

    /// The directory the published site lands in. The landing page is
    /// `{output_directory}/index.html`; redirect pages are
    /// `{output_directory}/redirect/{Label}.html`.
    pub output_directory: &'a Path,

    /// If true, render everything but write nothing; report the target
    /// paths instead.
    pub dryrun: bool,
}

impl Publisher<'_> {
    /// Renders and writes every file the decision calls for. Any template
    /// read or output write failure is fatal to the run.
    pub fn publish(&self, decision: &ContentDecision) -> Result<()> {
        match decision {
            ContentDecision::Placement { label, target } => {
                let redirect_name = redirect_file_name(label);
                let landing = render(
                    &self.load_template(self.sponsor_template(label))?,
                    &[
                        (BANNER_TOKEN, sponsor_banner(label).as_str()),
                        (
                            LINK_TOKEN,
                            format!("{}/{}", REDIRECT_DIRECTORY, redirect_name).as_str(),
                        ),
                        (ATTRIBUTION_TOKEN, label.as_str()),
                    ],
                );
                let redirect = render(
                    &self.load_template(REDIRECT_TEMPLATE)?,
                    &[(DESTINATION_TOKEN, target.as_str())],
                );
                self.write_page(&Path::new(REDIRECT_DIRECTORY).join(redirect_name), &redirect)?;
                self.write_page(Path::new(LANDING_PAGE), &landing)
            }
            ContentDecision::Promotion => {
                let landing = self.load_template(PROMOTION_TEMPLATE)?;
                self.write_page(Path::new(LANDING_PAGE), &landing)
            }
            ContentDecision::Cause { label, page } => {
                let landing = render(
                    &self.load_template(CAUSE_TEMPLATE)?,
                    &[
                        (BANNER_TOKEN, CAUSE_BANNER),
                        (
                            LINK_TOKEN,
                            format!("{}/{}", CAUSES_DIRECTORY, page).as_str(),
                        ),
                        (ATTRIBUTION_TOKEN, label.as_str()),
                    ],
                );
                self.write_page(Path::new(LANDING_PAGE), &landing)
            }
            ContentDecision::Default => {
                let landing = self.load_template(DEFAULT_TEMPLATE)?;
                self.write_page(Path::new(LANDING_PAGE), &landing)
            }
        }
    }

    // An image asset named exactly after the label selects the image-ad
    // variant.
    fn sponsor_template(&self, label: &str) -> &'static str {
        match self.asset_directory.join(label).is_file() {
            true => SPONSOR_IMAGE_TEMPLATE,
            false => SPONSOR_TEXT_TEMPLATE,
        }
    }

    fn load_template(&self, name: &str) -> Result<String> {
        let path = self.template_directory.join(name);
        fs::read_to_string(&path).map_err(|err| Error::Template { path, err })
    }

    fn write_page(&self, relative: &Path, contents: &str) -> Result<()> {
        let path = self.output_directory.join(relative);
        if self.dryrun {
            info!("dryrun: would write `{}`", path.display());
            return Ok(());
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| Error::Write {
                path: dir.to_owned(),
                err,
            })?;
        }
        fs::write(&path, contents).map_err(|err| Error::Write { path, err })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem materializing a decision.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be read.
    Template { path: PathBuf, err: std::io::Error },

    /// Returned when an output file or directory can't be written.
    Write { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
        }
    }
}
