use crate::document::Document;

/// Recursive character text splitter.
///
/// Splits on the coarsest separator that appears in the text, recursing
/// into finer separators for pieces that still exceed `chunk_size`, then
/// merges adjacent pieces back into chunks with `chunk_overlap` characters
/// carried between consecutive chunks. Lengths are in characters.
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(chunk_overlap < chunk_size, "overlap must be below chunk size");
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split documents into chunks, carrying metadata and a chunk index.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();
        for document in documents {
            for (index, text) in self.split_text(&document.page_content).into_iter().enumerate() {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk".to_string(), index.to_string());
                chunks.push(Document {
                    page_content: text,
                    metadata,
                });
            }
        }
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(|c| c.to_string()).collect()
        } else {
            text.split(separator.as_str()).map(str::to_string).collect()
        };

        let mut final_chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for split in splits {
            if char_len(&split) < self.chunk_size {
                pending.push(split);
                continue;
            }

            if !pending.is_empty() {
                final_chunks.extend(self.merge_splits(&pending, &separator));
                pending.clear();
            }

            if remaining.is_empty() {
                final_chunks.push(split);
            } else {
                final_chunks.extend(self.split_recursive(&split, remaining));
            }
        }

        if !pending.is_empty() {
            final_chunks.extend(self.merge_splits(&pending, &separator));
        }

        final_chunks
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: Vec<String> = Vec::new();

        let joined_len = |window: &[String]| -> usize {
            if window.is_empty() {
                return 0;
            }
            window.iter().map(|s| char_len(s)).sum::<usize>() + sep_len * (window.len() - 1)
        };

        for split in splits {
            let split_len = char_len(split);
            let extra = if window.is_empty() { 0 } else { sep_len };

            if joined_len(&window) + extra + split_len > self.chunk_size && !window.is_empty() {
                chunks.push(window.join(separator));

                // Slide the window: keep a tail within the overlap budget
                // that still leaves room for the incoming split.
                while !window.is_empty()
                    && (joined_len(&window) > self.chunk_overlap
                        || joined_len(&window) + sep_len + split_len > self.chunk_size)
                {
                    window.remove(0);
                }
            }

            window.push(split.clone());
        }

        if !window.is_empty() {
            chunks.push(window.join(separator));
        }

        chunks
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (String, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator.as_str()) {
            return (separator.clone(), &separators[i + 1..]);
        }
    }
    (String::new(), &[])
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let splitter = RecursiveCharacterSplitter::new(100, 20);
        let text = "lorem ipsum dolor sit amet ".repeat(80);

        let chunks = splitter.split_text(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "oversized chunk: {:?}", chunk);
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let splitter = RecursiveCharacterSplitter::new(9, 4);
        let chunks = splitter.split_text("aa bb cc dd ee ff");

        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0], "aa bb cc");
        assert!(chunks[1].starts_with("cc"), "no overlap in {:?}", chunks);
    }

    #[test]
    fn paragraph_boundaries_are_preferred() {
        let para_a = "a".repeat(600);
        let para_b = "b".repeat(600);
        let text = format!("{}\n\n{}", para_a, para_b);

        let splitter = RecursiveCharacterSplitter::new(1000, 200);
        let chunks = splitter.split_text(&text);

        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn unbroken_text_falls_back_to_character_split() {
        let splitter = RecursiveCharacterSplitter::new(50, 10);
        let text = "x".repeat(180);

        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn whitespace_only_input_yields_no_chunks() {
        let splitter = RecursiveCharacterSplitter::default();
        assert!(splitter.split_text("   \n\n   ").is_empty());
    }

    #[test]
    fn split_documents_carries_metadata_and_chunk_index() {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "notes.txt".to_string());
        let doc = Document {
            page_content: "first part ".repeat(30),
            metadata,
        };

        let splitter = RecursiveCharacterSplitter::new(80, 10);
        let chunks = splitter.split_documents(&[doc]);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata["source"], "notes.txt");
            assert_eq!(chunk.metadata["chunk"], i.to_string());
        }
    }
}
