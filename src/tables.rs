//! Read-only lookup data shared by the keyword extractor, the title matcher,
//! the similarity scorer and the fallback resolver.
//!
//! Built once at startup, either from the built-in defaults or from a JSON
//! file whose fields override the defaults one by one, then shared behind an
//! `Arc`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A canonical topic and the phrases that signal it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicEntry {
    pub name: String,
    pub synonyms: Vec<String>,
}

/// One curated landmark paper in the offline table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackEntry {
    pub key: String,
    pub keywords: Vec<String>,
    pub title: String,
    pub year: u32,
    pub snippet: String,
    pub authors: String,
    pub doi: Option<String>,
    pub venue: String,
    pub citation_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeTables {
    pub topics: Vec<TopicEntry>,
    pub technical_terms: Vec<String>,
    /// Generic English words ignored by the length-based keyword fallback.
    pub keyword_stop_words: Vec<String>,
    /// Articles and prepositions ignored by the similarity scorer.
    pub similarity_stop_words: Vec<String>,
    pub key_phrases: Vec<String>,
    /// Leading words that mark a message as a question rather than a title.
    pub question_words: Vec<String>,
    pub title_min_chars: usize,
    pub title_similarity_floor: f64,
    pub fallback_papers: Vec<FallbackEntry>,
}

impl KnowledgeTables {
    /// Load overrides from a JSON file. Fields absent from the file keep
    /// their built-in values.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge tables from {}", path.display()))?;
        let tables: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse knowledge tables in {}", path.display()))?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=100.0).contains(&self.title_similarity_floor),
            "title_similarity_floor must be within 0..=100, got {}",
            self.title_similarity_floor
        );
        for topic in &self.topics {
            anyhow::ensure!(!topic.synonyms.is_empty(), "topic '{}' has no synonyms", topic.name);
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn topic(name: &str, synonyms: &[&str]) -> TopicEntry {
    TopicEntry {
        name: name.to_string(),
        synonyms: strings(synonyms),
    }
}

impl Default for KnowledgeTables {
    fn default() -> Self {
        Self {
            topics: vec![
                topic("transformer", &["transformer", "attention mechanism", "self-attention", "bert", "gpt"]),
                topic("neural network", &["deep learning", "neural network", "deep neural", "cnn", "rnn", "perceptron", "backpropagation"]),
                topic("machine learning", &["machine learning", "ml algorithm", "supervised", "unsupervised", "classifier"]),
                topic("computer vision", &["computer vision", "image recognition", "object detection", "segmentation", "image classification"]),
                topic("natural language processing", &["nlp", "natural language", "text processing", "language model", "text mining", "sentiment analysis"]),
                topic("reinforcement learning", &["reinforcement learning", "rl", "policy gradient", "q-learning", "markov decision", "reward shaping"]),
                topic("generative model", &["gan", "generative", "adversarial network", "diffusion", "vae", "autoencoder"]),
                topic("convolutional network", &["cnn", "convolution", "resnet", "alexnet", "vgg"]),
                topic("graph neural network", &["graph neural", "gnn", "graph convolution", "node embedding", "message passing"]),
                topic("large language model", &["large language model", "llm", "instruction tuning", "few-shot", "in-context learning", "chatgpt", "prompting"]),
            ],
            technical_terms: strings(&[
                "algorithm", "benchmark", "embedding", "architecture", "optimization",
                "dataset", "classification", "regression", "clustering", "inference",
                "training", "fine-tuning", "pretraining", "evaluation", "framework",
                "encoder", "decoder", "tokenization", "gradient", "retrieval",
                "compression", "distributed", "scalability", "robustness", "interpretability",
            ]),
            keyword_stop_words: strings(&[
                "about", "explain", "please", "which", "would", "could", "should",
                "there", "their", "these", "those", "where", "describe", "summarize",
                "paper", "papers", "research", "something", "really", "other",
                "things", "using", "between", "because", "tell",
            ]),
            similarity_stop_words: strings(&[
                "the", "a", "an", "of", "in", "on", "for", "to", "and", "with", "by",
                "from", "at", "as", "into", "via", "using", "towards", "through", "is", "are",
            ]),
            key_phrases: strings(&[
                "object detection", "transfer learning", "neural network", "deep learning",
                "machine learning", "reinforcement learning", "computer vision",
                "natural language", "language model", "image classification",
                "semantic segmentation", "attention mechanism", "generative adversarial",
                "graph neural", "knowledge distillation", "few-shot", "self-supervised",
                "contrastive learning",
            ]),
            question_words: strings(&[
                "what", "how", "why", "when", "where", "who", "explain", "describe",
                "summarize", "tell me",
            ]),
            title_min_chars: 15,
            title_similarity_floor: 70.0,
            fallback_papers: default_fallback_papers(),
        }
    }
}

fn default_fallback_papers() -> Vec<FallbackEntry> {
    let paper = |key: &str,
                 keywords: &[&str],
                 title: &str,
                 year: u32,
                 snippet: &str,
                 authors: &str,
                 doi: &str,
                 venue: &str,
                 citation_count: u32| FallbackEntry {
        key: key.to_string(),
        keywords: strings(keywords),
        title: title.to_string(),
        year,
        snippet: snippet.to_string(),
        authors: authors.to_string(),
        doi: Some(doi.to_string()),
        venue: venue.to_string(),
        citation_count,
    };

    vec![
        paper(
            "transformer",
            &["transformer", "attention", "self-attention", "sequence", "translation"],
            "Attention Is All You Need",
            2017,
            "Introduced the Transformer architecture using self-attention mechanisms.",
            "Vaswani, A., Shazeer, N., Parmar, N., et al.",
            "10.5555/3295222.3295349",
            "NeurIPS 2017",
            50000,
        ),
        paper(
            "bert",
            &["bert", "pre-training", "bidirectional", "language model", "nlp"],
            "BERT: Pre-training of Deep Bidirectional Transformers",
            2018,
            "Introduced bidirectional pre-training for language representations.",
            "Devlin, J., Chang, M., Lee, K., Toutanova, K.",
            "10.18653/v1/N19-1423",
            "NAACL 2019",
            42000,
        ),
        paper(
            "gpt",
            &["gpt", "few-shot", "language model", "large language model", "in-context"],
            "Language Models are Few-Shot Learners",
            2020,
            "Introduced GPT-3 and demonstrated few-shot learning capabilities.",
            "Brown, T., Mann, B., Ryder, N., et al.",
            "10.5555/3495724.3495883",
            "NeurIPS 2020",
            15000,
        ),
        paper(
            "resnet",
            &["resnet", "residual", "deep network", "image recognition", "computer vision"],
            "Deep Residual Learning for Image Recognition",
            2016,
            "Introduced residual connections to train very deep neural networks.",
            "He, K., Zhang, X., Ren, S., Sun, J.",
            "10.1109/CVPR.2016.90",
            "CVPR 2016",
            45000,
        ),
        paper(
            "gan",
            &["generative", "adversarial", "gan", "image synthesis", "generative model"],
            "Generative Adversarial Networks",
            2014,
            "Introduced GANs for generative modeling using adversarial training.",
            "Goodfellow, I., Pouget-Abadie, J., Mirza, M., et al.",
            "10.5555/2969033.2969125",
            "NeurIPS 2014",
            38000,
        ),
        paper(
            "attention",
            &["attention", "alignment", "machine translation", "sequence-to-sequence", "encoder-decoder"],
            "Neural Machine Translation by Jointly Learning to Align and Translate",
            2014,
            "Introduced attention mechanism for sequence-to-sequence models.",
            "Bahdanau, D., Cho, K., Bengio, Y.",
            "10.48550/arXiv.1409.0473",
            "ICLR 2015",
            27000,
        ),
        paper(
            "cnn",
            &["cnn", "convolutional", "imagenet", "image classification", "alexnet"],
            "ImageNet Classification with Deep Convolutional Neural Networks",
            2012,
            "AlexNet: Breakthrough in image classification using deep CNNs.",
            "Krizhevsky, A., Sutskever, I., Hinton, G.",
            "10.1145/3065386",
            "NeurIPS 2012",
            40000,
        ),
    ]
}
