use std::path::{Path, PathBuf};

use englid::config::PipelineConfig;

pub const ENGLISH_PROSE: &str = "It is a truth universally acknowledged, that a single man in \
possession of a good fortune, must be in want of a wife. However little known the feelings or \
views of such a man may be on his first entering a neighbourhood, this truth is so well fixed in \
the minds of the surrounding families, that he is considered the rightful property of some one or \
other of their daughters. My dear Mr. Bennet, said his lady to him one day, have you heard that \
Netherfield Park is let at last? Mr. Bennet replied that he had not. But it is, returned she; for \
Mrs. Long has just been here, and she told me all about it. Mr. Bennet made no answer. Do you not \
want to know who has taken it? cried his wife impatiently. You want to tell me, and I have no \
objection to hearing it. This was invitation enough. Why, my dear, you must know, Mrs. Long says \
that Netherfield is taken by a young man of large fortune from the north of England; that he came \
down on Monday in a chaise and four to see the place, and was so much delighted with it, that he \
agreed with Mr. Morris immediately; that he is to take possession before Michaelmas, and some of \
his servants are to be in the house by the end of next week.";

/// Write the prose sample to `dir` and return its path.
pub fn write_prose(dir: &Path) -> PathBuf {
    let path = dir.join("prose.txt");
    std::fs::write(&path, ENGLISH_PROSE).expect("write prose");
    path
}

/// Config with short chunks and fixed seeds, storing everything under `data_dir`.
pub fn small_config(data_dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.storage.data_dir = Some(data_dir.to_path_buf());
    config.generator.chunk_length = 60;
    config.generator.seed = Some(17);
    config
}
