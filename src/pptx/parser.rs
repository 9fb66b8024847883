//! Decode orchestration: package → parts → model.
//!
//! The [`Decoder`] drives a single decode. It validates settings, opens the
//! package and reads the presentation part (the only fatal steps), then
//! walks themes, media, masters and slides in that order. Every other
//! failure is contained at the part or element boundary and surfaces as a
//! warning on the [`ParseResult`].

use super::mapper::{
    apply_theme, apply_theme_to_fill, ElementMapper, MapperOptions, PartKind, PlaceholderFrames,
};
use super::presentation::{parse_presentation, PresentationInfo, PRESENTATION_PART};
use super::slide::{check_root, parse_background, parse_slide_part};
use super::style::PartContext;
use super::theme::parse_theme_xml;
use crate::cache::{MediaIndex, ThemeCache, DEFAULT_THEME_CAPACITY};
use crate::container::{resolve_path, Package, Relationships};
use crate::error::{Error, Result};
use crate::model::{
    Background, Fill, MasterSlide, MediaFile, MediaKind, Presentation, Slide, SlideSize, Theme,
};
use crate::progress::{CancellationToken, ProgressSink, ProgressStage, ProgressTracker};
use crate::settings::ImportSettings;
use crate::units::emu_to_pixels;
use crate::xml::XmlElement;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const SLIDES_DIR: &str = "ppt/slides/";
const MASTERS_DIR: &str = "ppt/slideMasters/";
const THEMES_DIR: &str = "ppt/theme/";
const MEDIA_DIR: &str = "ppt/media/";

/// Outcome of a decode.
///
/// `success == false` means a fatal error; `data` is then `None` and
/// `errors` says why. Recovered problems are listed in `warnings`.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Presentation>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
    /// The decode stopped early on a cancellation request; `data` holds the
    /// slides decoded before that.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl ParseResult {
    /// Convert into a `Result`, turning a failed decode into its first error.
    pub fn into_result(self) -> Result<Presentation> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(Error::InvalidData(
                self.errors
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "decode produced no presentation".to_string()),
            )),
        }
    }
}

/// Decodes PPTX bytes into a [`Presentation`].
///
/// # Example
///
/// ```no_run
/// use pptxdom::{Decoder, ImportSettings};
///
/// let bytes = std::fs::read("deck.pptx")?;
/// let result = Decoder::new(ImportSettings::default()).decode(bytes, "deck.pptx");
/// for warning in &result.warnings {
///     eprintln!("warning: {}", warning);
/// }
/// if let Some(presentation) = result.data {
///     println!("{} slides", presentation.slide_count);
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Decoder<'a> {
    settings: ImportSettings,
    progress: Option<&'a dyn ProgressSink>,
    cancellation: Option<CancellationToken>,
}

impl<'a> Decoder<'a> {
    pub fn new(settings: ImportSettings) -> Self {
        Self {
            settings,
            progress: None,
            cancellation: None,
        }
    }

    /// Receive progress events during [`Decoder::decode`].
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Stop at the next part boundary once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Decode a PPTX byte stream. Never panics and never returns an error:
    /// failures are described by the returned [`ParseResult`].
    pub fn decode(&self, bytes: Vec<u8>, file_name: &str) -> ParseResult {
        let start = Instant::now();
        let mut tracker = ProgressTracker::new(self.progress);
        let mut warnings = Vec::new();

        tracker.emit(
            ProgressStage::Initializing,
            0,
            format!("Decoding {} ({} bytes)", file_name, bytes.len()),
        );

        let outcome = self.run(bytes, file_name, &mut tracker, &mut warnings);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok((presentation, cancelled)) => {
                let message = if cancelled {
                    format!("Cancelled after {} slides", presentation.slide_count)
                } else {
                    format!("Decoded {} slides", presentation.slide_count)
                };
                tracker.emit(ProgressStage::Completed, 100, message);
                log::debug!(
                    "{}: {} slides, {} warnings in {} ms",
                    file_name,
                    presentation.slide_count,
                    warnings.len(),
                    processing_time_ms
                );
                ParseResult {
                    success: true,
                    data: Some(presentation),
                    errors: Vec::new(),
                    warnings,
                    processing_time_ms,
                    cancelled,
                }
            }
            Err(err) => {
                log::warn!("{}: decode failed: {}", file_name, err);
                tracker.emit(ProgressStage::Error, 100, err.to_string());
                ParseResult {
                    success: false,
                    data: None,
                    errors: vec![err.to_string()],
                    warnings,
                    processing_time_ms,
                    cancelled: false,
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn run(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        tracker: &mut ProgressTracker<'_>,
        warnings: &mut Vec<String>,
    ) -> Result<(Presentation, bool)> {
        self.settings.validate()?;

        let package = Package::from_bytes(bytes)?;
        tracker.emit(ProgressStage::Loading, 5, "Opened package");

        if !package.exists(PRESENTATION_PART) {
            return Err(Error::MissingComponent(PRESENTATION_PART.to_string()));
        }
        let root = package.read_tree(PRESENTATION_PART).map_err(|err| {
            Error::MissingComponent(format!("{} is unreadable: {}", PRESENTATION_PART, err))
        })?;
        let rels = package
            .read_relationships(PRESENTATION_PART)
            .unwrap_or_else(|err| {
                push_warning(warnings, format!("presentation: relationships unreadable: {}", err));
                Relationships::new()
            });
        let info = parse_presentation(&root, &rels)?;
        warnings.extend(info.warnings.iter().cloned());

        let natural_width = emu_to_pixels(info.slide_width_emu);
        let natural_height = emu_to_pixels(info.slide_height_emu);
        let scale = self
            .settings
            .target_slide_size
            .scale_for(natural_width, natural_height);
        let slide_size = SlideSize {
            width_emu: info.slide_width_emu,
            height_emu: info.slide_height_emu,
            width: natural_width * scale,
            height: natural_height * scale,
            scale,
        };
        tracker.emit(
            ProgressStage::Loading,
            10,
            format!(
                "Presentation declares {} slides, scale {:.3}",
                info.slides.len(),
                scale
            ),
        );

        let mut presentation = Presentation {
            file_name: file_name.to_string(),
            metadata: package.core_metadata(),
            slide_size,
            slide_count: 0,
            slides: Vec::new(),
            masters: Vec::new(),
            themes: Vec::new(),
            media: Vec::new(),
        };

        let mut state = DecodeState {
            themes: ThemeStore::new(),
            media: MediaIndex::new(),
            masters: Vec::new(),
            layouts: Vec::new(),
            scale,
        };

        if self.load_themes(&package, &mut state, warnings) {
            push_warning(warnings, "decode cancelled while loading themes".to_string());
            return Ok((self.finish(presentation, state, Vec::new()), true));
        }
        state.themes.choose_fallback(&info.themes);
        tracker.emit(
            ProgressStage::Loading,
            20,
            format!("Loaded {} themes", state.themes.themes.len()),
        );

        // Media come before masters so image references in any part resolve
        // to canonical ids.
        let media = match self.load_media(&package, &mut state, warnings) {
            Some(media) => media,
            None => {
                push_warning(warnings, "decode cancelled while loading media".to_string());
                return Ok((self.finish(presentation, state, Vec::new()), true));
            }
        };
        presentation.media = media;
        tracker.emit(
            ProgressStage::Loading,
            30,
            format!(
                "Indexed {} media parts ({} unique)",
                state.media.len(),
                state.media.unique_count()
            ),
        );

        let master_parts = master_parts(&package, &info, warnings);
        if self.load_masters(&package, master_parts, &mut state, warnings) {
            push_warning(warnings, "decode cancelled while loading masters".to_string());
            return Ok((self.finish(presentation, state, Vec::new()), true));
        }
        tracker.emit(
            ProgressStage::Loading,
            40,
            format!("Loaded {} masters", state.masters.len()),
        );

        let slide_parts = numbered_parts(&package, SLIDES_DIR, "slide");
        let total = slide_parts.len();
        let parallel = self.parallel_mapping();
        let mut jobs = Vec::new();
        let mut outcomes = Vec::with_capacity(total);
        let mut cancelled = false;

        // Parts are read one at a time from the archive; sequential decodes
        // map each slide right away, parallel ones collect jobs first.
        for (position, (number, path)) in slide_parts.iter().enumerate() {
            if self.is_cancelled() {
                cancelled = true;
                break;
            }
            tracker.emit_slide(
                ProgressStage::Parsing,
                percent_between(40, 95, position, total),
                format!("Parsing slide {}", number),
                Some(position + 1),
                Some(total),
            );
            let id = info_slide_id(&info, path, *number);
            match self.read_slide(&package, &id, *number, path, &mut state, warnings) {
                Ok(job) if parallel => jobs.push(job),
                Ok(job) => outcomes.push(self.map_slide(&job, &state)),
                Err(err) => outcomes.push(SlideOutcome::Failed {
                    number: *number,
                    warning: format!("slide {}: skipped: {}", number, err),
                }),
            }
        }
        if parallel && !cancelled {
            outcomes.extend(self.map_parallel(&jobs, &state));
            tracker.emit_slide(
                ProgressStage::Parsing,
                95,
                format!("Mapped {} slides", jobs.len()),
                Some(total),
                Some(total),
            );
        }
        outcomes.sort_by_key(SlideOutcome::number);

        let mut slides = Vec::with_capacity(outcomes.len());
        let mut failed = 0usize;
        for outcome in outcomes {
            match outcome {
                SlideOutcome::Done { slide, warnings: w } => {
                    warnings.extend(w);
                    slides.push(slide);
                }
                SlideOutcome::Failed { warning, .. } => {
                    failed += 1;
                    push_warning(warnings, warning);
                }
                // Slides after the first cancelled one are dropped so the
                // partial result is a prefix of the deck
                SlideOutcome::Cancelled { .. } => {
                    cancelled = true;
                    break;
                }
            }
        }

        if !cancelled && info.slides.len() != slides.len() + failed {
            push_warning(
                warnings,
                format!(
                    "presentation declares {} slides but the package holds {} slide parts",
                    info.slides.len(),
                    slides.len() + failed
                ),
            );
        }
        if cancelled {
            push_warning(
                warnings,
                format!("decode cancelled after {} slides", slides.len()),
            );
        }

        Ok((self.finish(presentation, state, slides), cancelled))
    }

    /// Assemble the presentation from what has been decoded so far.
    fn finish(
        &self,
        mut presentation: Presentation,
        state: DecodeState,
        slides: Vec<Slide>,
    ) -> Presentation {
        presentation.slide_count = slides.len();
        presentation.slides = slides;
        presentation.masters = state.masters.into_iter().map(|m| m.slide).collect();
        presentation.themes = state.themes.themes;
        presentation
    }

    /// Parse every theme part. Returns `true` when cancelled.
    fn load_themes(
        &self,
        package: &Package,
        state: &mut DecodeState,
        warnings: &mut Vec<String>,
    ) -> bool {
        for (_, path) in numbered_parts(package, THEMES_DIR, "theme") {
            if self.is_cancelled() {
                return true;
            }
            let id = part_stem(&path).to_string();
            match package.read_xml(&path) {
                Ok(text) => {
                    let outcome = parse_theme_xml(&text, &id);
                    warnings.extend(outcome.warnings);
                    state.themes.insert(outcome.theme);
                }
                Err(err) => push_warning(warnings, format!("theme {}: skipped: {}", id, err)),
            }
        }
        false
    }

    /// Register media parts and build the media list. `None` when cancelled.
    fn load_media(
        &self,
        package: &Package,
        state: &mut DecodeState,
        warnings: &mut Vec<String>,
    ) -> Option<Vec<MediaFile>> {
        let mut entries: Vec<String> = package
            .entries_under(MEDIA_DIR)
            .into_iter()
            .map(|e| e.path)
            .filter(|p| !p[MEDIA_DIR.len()..].contains('/'))
            .collect();
        entries.sort_by(|a, b| {
            let key = |p: &str| (trailing_number(part_stem(p)).unwrap_or(u32::MAX), p.to_string());
            key(a).cmp(&key(b))
        });

        let mut media: Vec<MediaFile> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();
        for path in entries {
            if self.is_cancelled() {
                return None;
            }
            let name = path[MEDIA_DIR.len()..].to_string();
            let Some(kind) = name
                .rsplit_once('.')
                .and_then(|(_, ext)| MediaKind::from_extension(ext))
            else {
                log::debug!("{}: unrecognized media type, ignored", path);
                continue;
            };
            let bytes = match package.read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    push_warning(warnings, format!("media {}: skipped: {}", name, err));
                    continue;
                }
            };

            let registration = state.media.register(&path, &name, &bytes);
            if registration.duplicate {
                log::debug!("{}: duplicate of {}", name, registration.id);
                if let Some(&i) = position.get(&registration.id) {
                    media[i].duplicates.push(name);
                }
                continue;
            }

            let keep_data = kind != MediaKind::Image || self.settings.import_images;
            position.insert(registration.id.clone(), media.len());
            media.push(MediaFile {
                id: registration.id,
                mime_type: MediaFile::mime_from_filename(&name),
                size: bytes.len(),
                data: if keep_data { bytes } else { Vec::new() },
                name,
                path,
                kind,
                digest: registration.digest,
                duplicates: Vec::new(),
            });
        }
        Some(media)
    }

    /// Parse the given slide masters. Returns `true` when cancelled.
    fn load_masters(
        &self,
        package: &Package,
        parts: Vec<(u32, String)>,
        state: &mut DecodeState,
        warnings: &mut Vec<String>,
    ) -> bool {
        let options = MapperOptions::from(&self.settings);
        for (number, path) in parts {
            if self.is_cancelled() {
                return true;
            }
            let rels = package.read_relationships(&path).unwrap_or_else(|err| {
                push_warning(
                    warnings,
                    format!("master {}: relationships unreadable: {}", number, err),
                );
                Relationships::new()
            });
            let theme_ref = rels
                .first_of("theme")
                .filter(|r| !r.external)
                .map(|r| part_stem(&resolve_path(&path, &r.target)).to_string());

            let root = match package.read_tree(&path) {
                Ok(root) => root,
                Err(err) => {
                    push_warning(warnings, format!("master {}: skipped: {}", number, err));
                    continue;
                }
            };
            let id = format!("master{}", number);
            let ctx = PartContext {
                part_path: &path,
                rels: &rels,
                media: &state.media,
                scale: state.scale,
            };
            let mapper = ElementMapper::new(options, ctx).with_kind(PartKind::Master);
            let index = number as usize - 1;
            let content = match parse_slide_part(&root, PartKind::Master, &mapper, &ctx, index, &id)
            {
                Ok(content) => content,
                Err(err) => {
                    push_warning(warnings, format!("master {}: skipped: {}", number, err));
                    continue;
                }
            };
            warnings.extend(content.output.warnings);

            let theme = state.themes.resolve(theme_ref.as_deref());
            let mut elements = content.output.elements;
            apply_theme(&mut elements, &theme);
            let background = content.background.map(|mut fill| {
                apply_theme_to_fill(&mut fill, &theme);
                fill
            });

            let frames = root
                .path(&["cSld", "spTree"])
                .map(PlaceholderFrames::collect)
                .unwrap_or_default();

            state.masters.push(MasterState {
                path: path.clone(),
                frames,
                slide: MasterSlide {
                    name: content.name.unwrap_or_else(|| format!("Master {}", number)),
                    id,
                    number,
                    elements,
                    background: background.map(|fill| Background {
                        fill,
                        from_master: false,
                    }),
                    theme_ref,
                },
            });
        }
        false
    }

    /// Read a slide part, its relationships and its layout chain.
    fn read_slide(
        &self,
        package: &Package,
        id: &str,
        number: u32,
        path: &str,
        state: &mut DecodeState,
        warnings: &mut Vec<String>,
    ) -> Result<SlideJob> {
        let root = package.read_tree(path)?;
        check_root(&root, PartKind::Slide, path)?;
        let rels = package.read_relationships(path)?;

        let layout = match rels.first_of("slideLayout").filter(|r| !r.external) {
            Some(rel) => {
                let layout_path = resolve_path(path, &rel.target);
                self.layout_index(package, &layout_path, state, warnings)
            }
            None => None,
        };

        Ok(SlideJob {
            number,
            id: id.to_string(),
            path: path.to_string(),
            root,
            rels,
            layout,
        })
    }

    /// Index of a layout in `state.layouts`, decoding it on first use.
    fn layout_index(
        &self,
        package: &Package,
        path: &str,
        state: &mut DecodeState,
        warnings: &mut Vec<String>,
    ) -> Option<usize> {
        if let Some(i) = state.layouts.iter().position(|l| l.path == path) {
            return Some(i);
        }

        let root = match package.read_tree(path).and_then(|root| {
            check_root(&root, PartKind::Layout, path)?;
            Ok(root)
        }) {
            Ok(root) => root,
            Err(err) => {
                push_warning(warnings, format!("layout {}: ignored: {}", path, err));
                return None;
            }
        };
        let rels = package.read_relationships(path).unwrap_or_default();

        let master = rels
            .first_of("slideMaster")
            .filter(|r| !r.external)
            .map(|r| resolve_path(path, &r.target))
            .and_then(|master_path| state.masters.iter().position(|m| m.path == master_path));

        let mut frames = root
            .path(&["cSld", "spTree"])
            .map(PlaceholderFrames::collect)
            .unwrap_or_default();
        if let Some(m) = master {
            frames.merge_fallback(&state.masters[m].frames);
        }

        let ctx = PartContext {
            part_path: path,
            rels: &rels,
            media: &state.media,
            scale: state.scale,
        };
        let background = match root.path(&["cSld", "bg"]).map(|bg| parse_background(bg, &ctx)) {
            Some(Ok(fill)) => fill,
            Some(Err(err)) => {
                push_warning(warnings, format!("layout {}: background skipped: {}", path, err));
                None
            }
            None => None,
        };

        log::debug!(
            "layout {}: master {:?}, background {}",
            path,
            master.map(|m| &state.masters[m].slide.id),
            background.is_some()
        );
        state.layouts.push(LayoutState {
            path: path.to_string(),
            master,
            frames,
            background,
        });
        Some(state.layouts.len() - 1)
    }

    /// Whether slides are mapped on the rayon pool.
    fn parallel_mapping(&self) -> bool {
        if cfg!(feature = "parallel") {
            self.settings.parallel
        } else {
            if self.settings.parallel {
                log::debug!("parallel mapping requested but the `parallel` feature is off");
            }
            false
        }
    }

    #[cfg(feature = "parallel")]
    fn map_parallel(&self, jobs: &[SlideJob], state: &DecodeState) -> Vec<SlideOutcome> {
        use rayon::prelude::*;

        jobs.par_iter()
            .map(|job| {
                if self.is_cancelled() {
                    SlideOutcome::Cancelled { number: job.number }
                } else {
                    self.map_slide(job, state)
                }
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn map_parallel(&self, jobs: &[SlideJob], state: &DecodeState) -> Vec<SlideOutcome> {
        jobs.iter().map(|job| self.map_slide(job, state)).collect()
    }

    /// Map one slide. Touches only shared read-only state, so it can run on
    /// any thread.
    fn map_slide(&self, job: &SlideJob, state: &DecodeState) -> SlideOutcome {
        let layout = job.layout.map(|i| &state.layouts[i]);
        let master = layout.and_then(|l| l.master).map(|i| &state.masters[i]);

        let ctx = PartContext {
            part_path: &job.path,
            rels: &job.rels,
            media: &state.media,
            scale: state.scale,
        };
        let mut mapper =
            ElementMapper::new(MapperOptions::from(&self.settings), ctx).with_kind(PartKind::Slide);
        if let Some(layout) = layout {
            mapper = mapper.with_placeholders(&layout.frames);
        }

        let index = job.number as usize - 1;
        let parsed = parse_slide_part(&job.root, PartKind::Slide, &mapper, &ctx, index, &job.id);
        let content = match parsed {
            Ok(content) => content,
            Err(err) => {
                return SlideOutcome::Failed {
                    number: job.number,
                    warning: format!("slide {}: skipped: {}", job.number, err),
                }
            }
        };

        let theme = state
            .themes
            .resolve(master.and_then(|m| m.slide.theme_ref.as_deref()));
        let mut elements = content.output.elements;
        apply_theme(&mut elements, &theme);

        let mut background = content.background.map(|fill| Background {
            fill,
            from_master: false,
        });
        if background.is_none() && self.settings.include_master_background {
            let inherited: Option<Fill> = layout
                .and_then(|l| l.background.clone())
                .or_else(|| master.and_then(|m| m.slide.background.as_ref().map(|b| b.fill.clone())));
            background = inherited.map(|fill| Background {
                fill,
                from_master: true,
            });
        }
        if let Some(bg) = &mut background {
            apply_theme_to_fill(&mut bg.fill, &theme);
        }

        SlideOutcome::Done {
            slide: Slide {
                id: job.id.clone(),
                name: content
                    .name
                    .unwrap_or_else(|| format!("Slide {}", job.number)),
                number: job.number,
                elements,
                background,
                layout_ref: layout.map(|l| l.path.clone()),
                master_ref: master.map(|m| m.slide.id.clone()),
                hidden: content.hidden,
            },
            warnings: content.output.warnings,
        }
    }
}

/// Decode a PPTX byte stream with the given settings.
pub fn parse_bytes(bytes: Vec<u8>, file_name: &str, settings: ImportSettings) -> ParseResult {
    Decoder::new(settings).decode(bytes, file_name)
}

/// Read and decode a PPTX file. Fails only when the file cannot be read.
pub fn parse_file(path: impl AsRef<Path>, settings: ImportSettings) -> Result<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    Ok(parse_bytes(bytes, &display_name(path), settings))
}

/// Read and decode a PPTX file on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn decode_file_async(
    path: impl AsRef<Path>,
    settings: ImportSettings,
) -> Result<ParseResult> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let name = display_name(path);
    tokio::task::spawn_blocking(move || parse_bytes(bytes, &name, settings))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Per-decode state shared by the phases.
struct DecodeState {
    themes: ThemeStore,
    media: MediaIndex,
    masters: Vec<MasterState>,
    layouts: Vec<LayoutState>,
    scale: f64,
}

struct MasterState {
    path: String,
    frames: PlaceholderFrames,
    slide: MasterSlide,
}

struct LayoutState {
    path: String,
    /// Index into `DecodeState::masters`
    master: Option<usize>,
    /// Layout placeholders with the master's as fallback
    frames: PlaceholderFrames,
    background: Option<Fill>,
}

/// A slide part that has been read but not yet mapped.
struct SlideJob {
    number: u32,
    id: String,
    path: String,
    root: XmlElement,
    rels: Relationships,
    layout: Option<usize>,
}

enum SlideOutcome {
    Done { slide: Slide, warnings: Vec<String> },
    Failed { number: u32, warning: String },
    Cancelled { number: u32 },
}

impl SlideOutcome {
    fn number(&self) -> u32 {
        match self {
            SlideOutcome::Done { slide, .. } => slide.number,
            SlideOutcome::Failed { number, .. } | SlideOutcome::Cancelled { number } => *number,
        }
    }
}

/// Themes of this decode: the cache for lookups, the list for output.
struct ThemeStore {
    cache: ThemeCache,
    themes: Vec<Theme>,
    /// Deck-level theme for parts whose master chain names none
    fallback: Option<String>,
}

impl ThemeStore {
    fn new() -> Self {
        Self {
            cache: ThemeCache::new(DEFAULT_THEME_CAPACITY),
            themes: Vec::new(),
            fallback: None,
        }
    }

    fn insert(&mut self, theme: Theme) {
        self.cache.set(theme.id.clone(), theme.clone());
        self.themes.push(theme);
    }

    /// Pick the deck-level theme: the first one the presentation part
    /// references that was loaded, else the first loaded theme.
    fn choose_fallback(&mut self, referenced: &[String]) {
        let loaded = |id: &str| self.themes.iter().any(|t| t.id == id);
        let fallback = referenced
            .iter()
            .map(|path| part_stem(path))
            .find(|id| loaded(id))
            .or_else(|| self.themes.first().map(|t| t.id.as_str()))
            .map(str::to_string);
        log::debug!("deck theme: {:?}", fallback);
        self.fallback = fallback;
    }

    /// Theme by id. Without an id the deck-level theme is used; the default
    /// theme covers unknown ids and decks without themes.
    fn resolve(&self, id: Option<&str>) -> Arc<Theme> {
        let Some(id) = id.or(self.fallback.as_deref()) else {
            return Arc::new(Theme::default_theme("default"));
        };
        if let Some(theme) = self.cache.get(id) {
            return theme;
        }
        // Evicted from the cache: reload from the decoded list
        match self.themes.iter().find(|t| t.id == id) {
            Some(theme) => self.cache.set(id, theme.clone()),
            None => {
                log::debug!("theme {} not found; using default theme", id);
                Arc::new(Theme::default_theme(id))
            }
        }
    }
}

fn push_warning(warnings: &mut Vec<String>, warning: String) {
    log::warn!("{}", warning);
    warnings.push(warning);
}

/// Master parts to decode: `slideMasterN.xml` parts in numeric order, then
/// masters the presentation part declares under other names. Declared
/// masters without a part are reported.
fn master_parts(
    package: &Package,
    info: &PresentationInfo,
    warnings: &mut Vec<String>,
) -> Vec<(u32, String)> {
    let mut parts = numbered_parts(package, MASTERS_DIR, "slideMaster");
    let mut next = parts.last().map_or(1, |(n, _)| n + 1);
    for declared in &info.masters {
        let Some(path) = &declared.path else {
            push_warning(
                warnings,
                format!("presentation: master {} has no target part", declared.rel_id),
            );
            continue;
        };
        if parts.iter().any(|(_, p)| p == path) {
            continue;
        }
        if package.exists(path) {
            parts.push((next, path.clone()));
            next += 1;
        } else {
            push_warning(
                warnings,
                format!("presentation declares master {} but the part is missing", path),
            );
        }
    }
    parts
}

/// Slide id declared in the presentation part, else `slideN`.
fn info_slide_id(info: &PresentationInfo, path: &str, number: u32) -> String {
    match info.slide_id_for(path) {
        Some(id) if id > 0 => id.to_string(),
        _ => format!("slide{}", number),
    }
}

/// Parts directly under `dir` named `{stem}{N}.xml`, sorted by `N`.
fn numbered_parts(package: &Package, dir: &str, stem: &str) -> Vec<(u32, String)> {
    let mut parts: Vec<(u32, String)> = package
        .entries_under(dir)
        .into_iter()
        .filter_map(|entry| {
            let name = &entry.path[dir.len()..];
            let number = name
                .strip_prefix(stem)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            (number > 0).then_some((number, entry.path))
        })
        .collect();
    parts.sort();
    parts
}

/// File name without directory or extension.
fn part_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// Integer at the end of a file stem (`image12` → 12).
fn trailing_number(stem: &str) -> Option<u32> {
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[stem.len() - digits..].parse().ok()
}

fn percent_between(from: u8, to: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return to;
    }
    let span = (to - from) as usize;
    from + (span * done.min(total) / total) as u8
}
