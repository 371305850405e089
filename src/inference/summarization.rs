use std::path::Path;

use anyhow::{Context, anyhow};
use rten::{Model, NodeId};
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use tokenizers::Tokenizer;

use crate::inference::Summarize;
use crate::inference::config::{BartConfig, read_json, require_files};
use crate::models::Summary;

struct EncoderNodes {
    input_ids: NodeId,
    attention_mask: NodeId,
    last_hidden_state: NodeId,
}

struct DecoderNodes {
    input_ids: NodeId,
    encoder_attention_mask: NodeId,
    encoder_hidden_states: NodeId,
    logits: NodeId,
}

/// BART encoder-decoder summarizer running on rten with greedy decoding
pub struct BartSummarizer {
    encoder: Model,
    decoder: Model,
    tokenizer: Tokenizer,
    config: BartConfig,
    encoder_nodes: EncoderNodes,
    decoder_nodes: DecoderNodes,
}

impl BartSummarizer {
    /// Load `encoder.rten`, `decoder.rten`, `tokenizer.json` and `config.json` from `model_dir`
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let [encoder_path, decoder_path, tokenizer_path, config_path] = require_files(
            model_dir,
            ["encoder.rten", "decoder.rten", "tokenizer.json", "config.json"],
        )?;

        log::info!("Loading summarization model from {}", model_dir.display());
        let encoder = Model::load_file(&encoder_path)
            .with_context(|| format!("failed to load {}", encoder_path.display()))?;
        let decoder = Model::load_file(&decoder_path)
            .with_context(|| format!("failed to load {}", decoder_path.display()))?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("failed to load {}: {}", tokenizer_path.display(), e))?;
        let config: BartConfig = read_json(&config_path)?;

        let node = |model: &Model, name: &str| {
            model
                .find_node(name)
                .ok_or_else(|| anyhow!("summarization model has no '{}' node", name))
        };
        let encoder_nodes = EncoderNodes {
            input_ids: node(&encoder, "input_ids")?,
            attention_mask: node(&encoder, "attention_mask")?,
            last_hidden_state: node(&encoder, "last_hidden_state")?,
        };
        let decoder_nodes = DecoderNodes {
            input_ids: node(&decoder, "input_ids")?,
            encoder_attention_mask: node(&decoder, "encoder_attention_mask")?,
            encoder_hidden_states: node(&decoder, "encoder_hidden_states")?,
            logits: node(&decoder, "logits")?,
        };

        log::debug!(
            "Summarization model ready (min_length {}, max_length {})",
            config.min_length,
            config.max_length
        );

        Ok(Self {
            encoder,
            decoder,
            tokenizer,
            config,
            encoder_nodes,
            decoder_nodes,
        })
    }

    fn encode_prompt(&self, text: &str) -> anyhow::Result<Vec<i32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenization failed: {}", e))?;
        let mut ids: Vec<i32> = encoding.get_ids().iter().map(|&id| id as i32).collect();

        let limit = self.config.max_position_embeddings;
        if ids.len() > limit {
            log::debug!("Truncating input from {} to {} tokens", ids.len(), limit);
            ids.truncate(limit);
            ids[limit - 1] = self.config.eos_token_id as i32;
        }
        Ok(ids)
    }
}

impl Summarize for BartSummarizer {
    fn summarize(&self, text: &str) -> anyhow::Result<Vec<Summary>> {
        let input_ids = self.encode_prompt(text)?;
        let seq_len = input_ids.len();
        log::info!("Summarizing {} input tokens", seq_len);

        let input_ids = NdTensor::from_data([1, seq_len], input_ids);
        let attention_mask = NdTensor::from_data([1, seq_len], vec![1i32; seq_len]);

        let [hidden] = self
            .encoder
            .run_n(
                vec![
                    (self.encoder_nodes.input_ids, input_ids.view().into()),
                    (self.encoder_nodes.attention_mask, attention_mask.view().into()),
                ],
                [self.encoder_nodes.last_hidden_state],
                None,
            )
            .context("encoder failed")?;
        let hidden: NdTensor<f32, 3> = hidden
            .try_into()
            .map_err(|e| anyhow!("unexpected encoder output: {:?}", e))?;

        let mut generated = vec![self.config.decoder_start_token_id];
        while generated.len() < self.config.max_length {
            let len = generated.len();
            let decoder_ids = NdTensor::from_data(
                [1, len],
                generated.iter().map(|&id| id as i32).collect::<Vec<_>>(),
            );
            let [logits] = self
                .decoder
                .run_n(
                    vec![
                        (self.decoder_nodes.input_ids, decoder_ids.view().into()),
                        (
                            self.decoder_nodes.encoder_attention_mask,
                            attention_mask.view().into(),
                        ),
                        (self.decoder_nodes.encoder_hidden_states, hidden.view().into()),
                    ],
                    [self.decoder_nodes.logits],
                    None,
                )
                .context("decoder failed")?;
            let logits: NdTensor<f32, 3> = logits
                .try_into()
                .map_err(|e| anyhow!("unexpected decoder output: {:?}", e))?;

            let [_, _, vocab] = logits.shape();
            let last: Vec<f32> = (0..vocab).map(|v| logits[[0, len - 1, v]]).collect();
            let next = next_token(&last, &generated, &self.config);
            generated.push(next);

            if next == self.config.eos_token_id {
                break;
            }
            if generated.len() % 16 == 0 {
                log::debug!("Generated {} tokens", generated.len());
            }
        }

        let summary_text = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| anyhow!("failed to decode summary: {}", e))?;
        log::info!("Summary complete: {} tokens", generated.len());

        Ok(vec![Summary {
            summary_text: summary_text.trim().to_string(),
        }])
    }
}

/// Greedy pick for the next decoder token.
///
/// `generated` always starts with the decoder start token. Applies, in order: the forced
/// BOS after the start token, the forced EOS at `max_length`, EOS suppression before
/// `min_length`, and the no-repeat n-gram ban.
pub fn next_token(logits: &[f32], generated: &[u32], config: &BartConfig) -> u32 {
    if generated.len() == 1 {
        if let Some(bos) = config.forced_bos_token_id {
            return bos;
        }
    }
    if generated.len() + 1 >= config.max_length {
        return config.eos_token_id;
    }

    let mut banned = banned_ngram_tokens(generated, config.no_repeat_ngram_size);
    if generated.len() < config.min_length {
        banned.push(config.eos_token_id);
    }

    logits
        .iter()
        .enumerate()
        .filter(|(id, _)| !banned.contains(&(*id as u32)))
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(id, _)| id as u32)
        .unwrap_or(config.eos_token_id)
}

/// Tokens that would complete an n-gram already present in `generated`
fn banned_ngram_tokens(generated: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || generated.len() + 1 < n {
        return Vec::new();
    }
    let prefix = &generated[generated.len() + 1 - n..];
    generated
        .windows(n)
        .filter(|window| &window[..n - 1] == prefix)
        .map(|window| window[n - 1])
        .collect()
}
