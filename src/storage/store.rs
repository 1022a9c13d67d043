//! Durable guide persistence.
//!
//! A guide is stored as a directory bundle under `<base>/guides/<safeId>/`:
//! a `guide.json` metadata file whose screenshots are replaced by relative
//! file references, and an `images/` subdirectory holding one binary file
//! per screenshot. `<base>/library.json` is the summary index. The metadata
//! file is always written before the index, so a crash between the two
//! leaves an orphan bundle (detectable, non-fatal) rather than a dangling
//! index entry.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{info, warn};

use crate::document::ops::{deserialize_guide, serialize_guide};
use crate::error::{Error, Result, ValidationError};
use crate::models::validate::ensure_valid;
use crate::models::{Guide, Screenshot};

use super::index::{GuideSummary, LibraryIndex};

const GUIDES_DIR: &str = "guides";
const IMAGES_DIR: &str = "images";
const METADATA_FILE: &str = "guide.json";
const INDEX_FILE: &str = "library.json";

/// Filesystem-safe form of a guide id: anything outside `[A-Za-z0-9-]`
/// becomes an underscore.
pub fn safe_id(guide_id: &str) -> String {
    guide_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

pub struct GuideStore {
    base_path: PathBuf,
    guides_path: PathBuf,
    index_path: PathBuf,
}

impl GuideStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        let guides_path = base_path.join(GUIDES_DIR);
        let index_path = base_path.join(INDEX_FILE);
        Self {
            base_path,
            guides_path,
            index_path,
        }
    }

    /// Platform config directory plus the app folder, e.g.
    /// `~/Library/Application Support/Stepflow` on macOS.
    pub fn default_base_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Stepflow")
    }

    /// Creates the directory layout and an empty index if none exists yet.
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.guides_path)?;
        if !self.index_path.exists() {
            self.save_index(&LibraryIndex::empty())?;
        }
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn guide_dir(&self, guide_id: &str) -> PathBuf {
        self.guides_path.join(safe_id(guide_id))
    }

    fn metadata_path(&self, guide_id: &str) -> PathBuf {
        self.guide_dir(guide_id).join(METADATA_FILE)
    }

    fn images_dir(&self, guide_id: &str) -> PathBuf {
        self.guide_dir(guide_id).join(IMAGES_DIR)
    }

    /// An unreadable or missing index degrades to empty rather than failing
    /// the operation; the next save rewrites it.
    fn load_index(&self) -> LibraryIndex {
        match fs::read_to_string(&self.index_path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("library index unreadable, starting fresh: {err}");
                LibraryIndex::empty()
            }),
            Err(_) => LibraryIndex::empty(),
        }
    }

    fn save_index(&self, index: &LibraryIndex) -> Result<()> {
        fs::write(&self.index_path, serde_json::to_string_pretty(index)?)?;
        Ok(())
    }

    /// Persists a guide bundle. With `extract_images` set, every inlined
    /// screenshot is decoded to a file under `images/` and the stored step
    /// keeps only the relative reference. Idempotent per guide id.
    pub fn save_guide(&self, guide: &Guide, extract_images: bool) -> Result<()> {
        let guide = ensure_valid(guide.clone())?;
        let guide_dir = self.guide_dir(&guide.id);
        let images_dir = self.images_dir(&guide.id);
        fs::create_dir_all(&guide_dir)?;
        fs::create_dir_all(&images_dir)?;

        let mut stored = guide.clone();
        if extract_images {
            for (index, step) in stored.steps.iter_mut().enumerate() {
                let Some(Screenshot::Inline { base64, mime }) = step.screenshot.clone() else {
                    continue;
                };
                let bytes = BASE64.decode(&base64).map_err(|err| {
                    Error::SchemaViolation(vec![ValidationError::new(
                        format!("steps[{index}].screenshotBase64"),
                        format!("invalid base64 payload: {err}"),
                    )])
                })?;

                let ext = if mime == "image/jpeg" { "jpg" } else { "png" };
                let id8: String = step.id.chars().take(8).collect();
                let file_name = format!("step-{}-{id8}.{ext}", index + 1);
                fs::write(images_dir.join(&file_name), bytes)?;

                step.screenshot = Some(Screenshot::OnDisk {
                    path: format!("{IMAGES_DIR}/{file_name}"),
                    mime,
                });
            }
        }

        // Metadata first, index second.
        fs::write(self.metadata_path(&guide.id), serialize_guide(&stored)?)?;

        let mut index = self.load_index();
        index.upsert(GuideSummary::from(&guide));
        self.save_index(&index)?;

        info!("saved guide {} ({} steps)", guide.id, guide.steps.len());
        Ok(())
    }

    /// Loads a guide bundle. With `embed_images` set, every on-disk
    /// reference is read back and re-inlined; a reference whose file has
    /// gone missing is left untouched.
    pub fn load_guide(&self, guide_id: &str, embed_images: bool) -> Result<Guide> {
        let metadata_path = self.metadata_path(guide_id);
        if !metadata_path.exists() {
            return Err(Error::NotFound {
                guide_id: guide_id.to_string(),
            });
        }

        let contents = fs::read_to_string(&metadata_path)?;
        let mut guide = deserialize_guide(&contents)?;

        if embed_images {
            let guide_dir = self.guide_dir(guide_id);
            for step in &mut guide.steps {
                let Some(Screenshot::OnDisk { path, mime }) = step.screenshot.clone() else {
                    continue;
                };
                let image_path = guide_dir.join(&path);
                if !image_path.exists() {
                    warn!("screenshot file missing for step {}: {path}", step.id);
                    continue;
                }
                let bytes = fs::read(&image_path)?;
                step.screenshot = Some(Screenshot::Inline {
                    base64: BASE64.encode(bytes),
                    mime,
                });
            }
        }

        Ok(guide)
    }

    /// Removes the bundle directory and the index entry. A nonexistent
    /// guide id is a no-op, not an error.
    pub fn delete_guide(&self, guide_id: &str) -> Result<()> {
        let guide_dir = self.guide_dir(guide_id);
        if guide_dir.exists() {
            fs::remove_dir_all(&guide_dir)?;
            info!("deleted guide {guide_id}");
        }

        let mut index = self.load_index();
        index.remove(guide_id);
        self.save_index(&index)
    }

    /// Index entries sorted by update time, most recent first.
    pub fn list_guides(&self) -> Vec<GuideSummary> {
        let mut guides = self.load_index().guides;
        guides.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        guides
    }

    /// Existence check on the metadata file alone; never loads the guide.
    pub fn guide_exists(&self, guide_id: &str) -> bool {
        self.metadata_path(guide_id).exists()
    }

    /// Writes the fully embedded guide as standalone JSON.
    pub fn export_guide_json(&self, guide_id: &str, output_path: &Path) -> Result<()> {
        let guide = self.load_guide(guide_id, true)?;
        fs::write(output_path, serialize_guide(&guide)?)?;
        Ok(())
    }

    /// Validates and saves a standalone guide JSON file into the library.
    pub fn import_guide_json(&self, json_path: &Path) -> Result<Guide> {
        let contents = fs::read_to_string(json_path)?;
        let guide = deserialize_guide(&contents)?;
        self.save_guide(&guide, true)?;
        Ok(guide)
    }
}
