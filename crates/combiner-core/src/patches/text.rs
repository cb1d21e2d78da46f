//! Text table rewrites
//!
//! The race and arcade text tables tell the player to swap discs. Each string
//! lives in a fixed-width, NUL-padded field, so replacements are padded to the
//! same width and written over the first occurrence.

use memchr::memmem;
use tracing::debug;

use crate::error::{Error, Result};

pub struct TextReplacement {
    pub search: &'static [u8],
    pub width: usize,
    pub replace: &'static [u8],
}

const fn entry(search: &'static [u8], width: usize, replace: &'static [u8]) -> TextReplacement {
    TextReplacement {
        search,
        width,
        replace,
    }
}

pub const DISC_SWAP_TEXT: &[TextReplacement] = &[
    // Race strings
    entry(b"in the ARCADE MODE DISC", 29, b"in ARCADE MODE"),
    entry(b"on ARCADE MODE DISC", 29, b"in ARCADE MODE"),
    entry(b"sur le CD du MODE ARCADE", 29, b"dans le MODE ARCADE"),
    entry(b"auf der ARCADE-MODUS-CD", 29, b"im ARCADE-MODUS"),
    entry(b"nel DISCO A  MODALIT\xC0 ARCADE", 29, b"nella MODALIT\xC0 ARCADE"),
    entry(b"en el DISCO DE MODO ARCADE", 29, b"en el MODO ARCADE"),
    // Arcade strings
    entry(
        b"Obtain Licences in Disk 2 to Access All Courses",
        59,
        b"Obtain Licenses in Simulation Mode to Access All Courses",
    ),
    entry(
        b"Obtain Licences in GT mode to Access All Courses",
        59,
        b"Obtain Licences in GT Mode to Access All Courses",
    ),
    entry(
        b"Passer permis du CD 2 pour participer aux \xE9preuves",
        59,
        b"Passer les permis du Mode GT pour d\xE9bloquer les circuits",
    ),
    entry(
        b"Erwerben Sie Lizenzen f\x6Er alle Strecken auf CD 2",
        59,
        b"Erwerben Sie Lizenzen f\x6Er alle Strecken im GT-Modus",
    ),
    entry(
        b"Ottieni le patenti nel Disco 2 e accedi a tutti i percorsi",
        59,
        b"Ottieni le patenti nella Modalit\xE0 GT e accedi ai percorsi",
    ),
    entry(
        b"Obtenga carnes del Disco 2 para correr",
        59,
        b"Obtenga carnes en GT Modo para correr",
    ),
];

fn padded(text: &[u8], width: usize) -> Result<Vec<u8>> {
    if text.len() > width {
        return Err(Error::TextTable {
            text: String::from_utf8_lossy(text).into_owned(),
            width,
        });
    }
    let mut field = text.to_vec();
    field.resize(width, 0);
    Ok(field)
}

/// Apply `table` to `buf`, returning how many entries matched
pub fn rewrite_text(buf: &mut [u8], table: &[TextReplacement]) -> Result<usize> {
    let fields = table
        .iter()
        .map(|e| Ok((padded(e.search, e.width)?, padded(e.replace, e.width)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut replaced = 0;
    for (search, replace) in &fields {
        if let Some(pos) = memmem::find(buf, search) {
            buf[pos..pos + replace.len()].copy_from_slice(replace);
            replaced += 1;
        }
    }

    debug!("Rewrote {}/{} text entries", replaced, table.len());
    Ok(replaced)
}

/// Apply the disc swap table
pub fn rewrite_disc_swap_text(buf: &mut [u8]) -> Result<usize> {
    rewrite_text(buf, DISC_SWAP_TEXT)
}
