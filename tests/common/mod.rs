#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use pdf_qa::answer::CompletionModel;
use pdf_qa::embeddings::Embedder;

const DIMENSIONS: usize = 64;

/// Hashes words into a fixed-size bag-of-words vector
#[derive(Default)]
pub struct HashingEmbedder {
    calls: AtomicUsize,
}

impl HashingEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> pdf_qa::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; DIMENSIONS];
                for word in text
                    .to_lowercase()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| w.len() > 3)
                {
                    vector[(fnv1a(word) % DIMENSIONS as u64) as usize] += 1.0;
                }
                vector
            })
            .collect())
    }
}

/// Answers with the context section of the prompt it was given
#[derive(Default)]
pub struct ContextEchoModel {
    prompts: Mutex<Vec<String>>,
}

impl ContextEchoModel {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .expect("lock should not be poisoned")
            .clone()
    }
}

impl CompletionModel for ContextEchoModel {
    fn complete(&self, prompt: &str) -> pdf_qa::Result<String> {
        self.prompts
            .lock()
            .expect("lock should not be poisoned")
            .push(prompt.to_string());

        let context = prompt
            .split("\n\nQuestion:")
            .next()
            .and_then(|head| head.split_once("\n\n"))
            .map(|(_, context)| context.to_string())
            .unwrap_or_default();
        Ok(format!(" Based on the documents: {}\n", context))
    }
}
