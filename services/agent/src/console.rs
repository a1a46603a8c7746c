//! Console mode: the local microphone and speaker stand in for a hosted
//! room, so any agent kind can be tried without the server.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use collections_core::{
    AgentAudio, AgentKind, CallIo, CallRoom, CallerEvent, Participant, Prompts, run_job,
};
use collections_native_utils::audio::{
    self, ChunkedResampler, REALTIME_API_PCM16_SAMPLE_RATE, convert_f32_to_i16, convert_i16_to_f32,
};
use collections_native_utils::device;
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FrameCount, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use tokio::sync::mpsc;

use crate::config::{
    CALL_CHANNEL_CAPACITY, Config, INPUT_CHUNK_SIZE, OUTPUT_CHUNK_SIZE, OUTPUT_LATENCY_MS,
};

pub const CONSOLE_IDENTITY: &str = "console-user";

/// A room whose only caller is whoever sits at this machine.
pub struct ConsoleRoom {
    name: String,
    metadata: Option<String>,
    io: Option<CallIo>,
}

#[async_trait]
impl CallRoom for ConsoleRoom {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    async fn wait_for_participant(&mut self) -> Result<(Participant, CallIo)> {
        let io = self.io.take().context("Console caller already attached")?;
        Ok((
            Participant {
                identity: CONSOLE_IDENTITY.to_string(),
            },
            io,
        ))
    }
}

/// Keeps the cpal streams alive; dropping it stops audio.
pub struct AudioStreams {
    _input: cpal::Stream,
    _output: cpal::Stream,
}

/// Opens the default microphone and speaker and bridges them to the call
/// channels, resampling to and from 24 kHz.
fn open_audio(
    caller_tx: mpsc::Sender<CallerEvent>,
    mut agent_rx: mpsc::Receiver<AgentAudio>,
) -> Result<AudioStreams> {
    // --- Input ---
    let input = device::get_or_default_input(None)
        .context("Failed to get default audio input device")?;
    tracing::info!("Using input device: {:?}", &input.name()?);
    let input_config = input
        .default_input_config()
        .context("Failed to get default input config")?;
    let input_config = StreamConfig {
        channels: input_config.channels(),
        sample_rate: input_config.sample_rate(),
        buffer_size: cpal::BufferSize::Fixed(FrameCount::from(INPUT_CHUNK_SIZE as u32)),
    };
    let input_channel_count = input_config.channels as usize;
    let input_sample_rate = input_config.sample_rate.0 as f64;
    tracing::info!("Input stream config: {:?}", &input_config);

    let (mic_tx, mut mic_rx) = mpsc::channel::<Vec<f32>>(CALL_CHANNEL_CAPACITY);
    let input_data_fn = move |data: &[f32], _: &cpal::InputCallbackInfo| {
        let mono = if input_channel_count > 1 {
            data.chunks(input_channel_count)
                .map(|c| c.iter().sum::<f32>() / input_channel_count as f32)
                .collect::<Vec<f32>>()
        } else {
            data.to_vec()
        };
        if let Err(e) = mic_tx.try_send(mono) {
            tracing::warn!("Failed to queue microphone audio: {:?}", e);
        }
    };
    let input_stream = input.build_input_stream(
        &input_config,
        input_data_fn,
        move |err| tracing::error!("An error occurred on input stream: {}", err),
        None,
    )?;

    let mut in_resampler =
        ChunkedResampler::new(input_sample_rate, REALTIME_API_PCM16_SAMPLE_RATE, INPUT_CHUNK_SIZE)?;
    tokio::spawn(async move {
        while let Some(samples) = mic_rx.recv().await {
            match in_resampler.process(&samples) {
                Ok(resampled) if !resampled.is_empty() => {
                    let pcm = convert_f32_to_i16(&resampled);
                    if caller_tx.send(CallerEvent::Audio(pcm)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to resample microphone audio: {}", e),
            }
        }
    });

    // --- Output ---
    let output = device::get_or_default_output(None)
        .context("Failed to get default audio output device")?;
    tracing::info!("Using output device: {:?}", &output.name()?);
    let output_config = output
        .default_output_config()
        .context("Failed to get default output config")?;
    let output_config = StreamConfig {
        channels: output_config.channels(),
        sample_rate: output_config.sample_rate(),
        buffer_size: cpal::BufferSize::Fixed(FrameCount::from(OUTPUT_CHUNK_SIZE as u32)),
    };
    let output_channel_count = output_config.channels as usize;
    let output_sample_rate = output_config.sample_rate.0 as f64;
    tracing::info!("Output stream config: {:?}", &output_config);

    let buffer = audio::shared_buffer(output_sample_rate as usize * OUTPUT_LATENCY_MS / 1000);
    let (mut speaker_tx, mut speaker_rx) = buffer.split();
    let flush = Arc::new(AtomicBool::new(false));

    let flush_requested = flush.clone();
    let output_data_fn = move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
        if flush_requested.swap(false, Ordering::AcqRel) {
            speaker_rx.clear();
        }
        for frame in data.chunks_mut(output_channel_count) {
            let sample = speaker_rx.try_pop().unwrap_or(0.0);
            // Same sample on the first two channels, silence elsewhere.
            for (ch, out) in frame.iter_mut().enumerate() {
                *out = if ch < 2 { sample } else { 0.0 };
            }
        }
    };
    let output_stream = output.build_output_stream(
        &output_config,
        output_data_fn,
        move |err| tracing::error!("An error occurred on output stream: {}", err),
        None,
    )?;

    let mut out_resampler = ChunkedResampler::new(
        REALTIME_API_PCM16_SAMPLE_RATE,
        output_sample_rate,
        OUTPUT_CHUNK_SIZE,
    )?;
    tokio::spawn(async move {
        while let Some(audio) = agent_rx.recv().await {
            match audio {
                AgentAudio::Pcm(pcm) => match out_resampler.process(&convert_i16_to_f32(&pcm)) {
                    Ok(samples) => {
                        let pushed = speaker_tx.push_slice(&samples);
                        if pushed < samples.len() {
                            tracing::warn!(
                                "Playback buffer full, dropped {} samples",
                                samples.len() - pushed
                            );
                        }
                    }
                    Err(e) => tracing::warn!("Failed to resample agent audio: {}", e),
                },
                AgentAudio::Interrupt => {
                    tracing::debug!("Caller interrupted, flushing playback");
                    flush.store(true, Ordering::Release);
                }
            }
        }
    });

    input_stream.play()?;
    output_stream.play()?;
    Ok(AudioStreams {
        _input: input_stream,
        _output: output_stream,
    })
}

/// Runs one call of `kind` against the local sound card until Ctrl-C.
pub async fn run(
    kind: AgentKind,
    metadata: Option<String>,
    config: Arc<Config>,
    prompts: Prompts,
) -> Result<()> {
    let realtime = config.realtime()?;

    let (caller_tx, caller_rx) = mpsc::channel(CALL_CHANNEL_CAPACITY);
    let (agent_tx, agent_rx) = mpsc::channel(CALL_CHANNEL_CAPACITY);
    let _streams = open_audio(caller_tx.clone(), agent_rx)?;
    tracing::info!(
        "Console ready, speak into the microphone. Headphones avoid the agent hearing itself."
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, hanging up...");
            let _ = caller_tx.send(CallerEvent::Disconnected).await;
        }
    });

    let room = ConsoleRoom {
        name: format!("console-{}", kind),
        metadata,
        io: Some(CallIo { caller_rx, agent_tx }),
    };
    let context = run_job(room, kind, &prompts, Local::now().date_naive(), || {
        openai_realtime::connect_with_config(CALL_CHANNEL_CAPACITY * 4, realtime)
    })
    .await?;
    tracing::info!("Call finished after {} turns", context.turns());
    Ok(())
}

pub fn list_devices() -> Result<()> {
    println!("Input devices:\n{}", device::get_available_inputs()?);
    println!("Output devices:\n{}", device::get_available_outputs()?);
    Ok(())
}
