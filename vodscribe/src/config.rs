use std::path::{Path, PathBuf};

/// Options for acquiring source media via yt-dlp.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory the media file and its metadata sidecar land in.
    pub output_dir: PathBuf,
    /// yt-dlp format selector used when `download_video` is false.
    pub format: String,
    /// Fetch combined best video+audio instead of `format`.
    pub download_video: bool,
    /// Pass `--force-overwrites` to replace existing downloads.
    pub force_overwrites: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: "bestaudio/best".into(),
            download_video: true,
            force_overwrites: false,
        }
    }
}

impl DownloadOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn download_video(mut self, enabled: bool) -> Self {
        self.download_video = enabled;
        self
    }

    pub fn force_overwrites(mut self, enabled: bool) -> Self {
        self.force_overwrites = enabled;
        self
    }

    /// The `-f` argument handed to yt-dlp.
    pub fn selector_arg(&self) -> String {
        if self.download_video {
            "bestvideo+bestaudio/best".into()
        } else {
            self.format.clone()
        }
    }
}

/// Options for one transcription engine invocation.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Model name or path, passed to the engine verbatim.
    pub model: String,
    /// Language code for transcription (e.g. "en", "de").
    pub language: String,
    /// Directory + stem the retained artifacts are renamed to.
    /// Defaults to the input media's own directory and stem.
    pub output_base: Option<PathBuf>,
    /// Requested artifact formats. Normalized before reconciliation:
    /// case-insensitive, deduplicated, "json-full" aliases to "json",
    /// and "json" is always kept.
    pub formats: Vec<String>,
    /// Engine executables to try in order, overriding the built-in
    /// candidate list (env override, PATH, venv-local paths).
    pub engine_candidates: Option<Vec<PathBuf>>,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            model: "large-v2".into(),
            language: "en".into(),
            output_base: None,
            formats: vec!["json".into()],
            engine_candidates: None,
        }
    }
}

impl TranscribeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn output_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.output_base = Some(base.into());
        self
    }

    pub fn formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn engine_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.engine_candidates = Some(candidates);
        self
    }

    /// Resolve the output base for a given input media path.
    pub(crate) fn resolve_output_base(&self, input: &Path) -> PathBuf {
        self.output_base
            .clone()
            .unwrap_or_else(|| input.with_extension(""))
    }
}
