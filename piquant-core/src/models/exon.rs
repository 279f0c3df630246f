use std::fmt::{self, Display};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(format!("Invalid strand: {}", s)),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// An exon as written in a GTF file: 1-based, inclusive coordinates.
///
/// Two exons are the same exon only if sequence, start, end and strand
/// all agree, so the derived equality and hash are exactly that.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exon {
    pub seqname: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl Exon {
    pub fn new(seqname: &str, start: u64, end: u64, strand: Strand) -> Self {
        Exon {
            seqname: seqname.to_string(),
            start,
            end,
            strand,
        }
    }

    /// Number of bases covered by the exon.
    pub fn length(&self) -> u64 {
        self.end + 1 - self.start
    }
}

impl Display for Exon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}({})", self.seqname, self.start, self.end, self.strand)
    }
}
