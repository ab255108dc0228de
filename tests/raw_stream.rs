use anyhow::Result;
use docstream::testing::*;
use docstream::{
    stream_raw, ChannelSink, ChunkSource, ErrorKind, Pipeline, StreamConfig, WriterSink,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn raw_stream_forwards_chunks_unchanged() -> Result<()> {
    let body = sample_text(50_000);
    let fx = DocFixture::new()?
        .with_config(StreamConfig::default().with_buffer_size(4096))
        .with_document("log", &body)?;
    let mut sink = MemorySink::new();

    let summary = stream_raw(fx.config(), "log", &mut sink)?;

    assert_eq!(sink.writes().len(), 50_000usize.div_ceil(4096));
    assert!(sink.writes().iter().all(|w| !w.is_empty() && w.len() <= 4096));
    assert_eq!(sink.text(), body);
    assert_eq!(summary.bytes_written, 50_000);
    assert_eq!(summary.pauses, 0);
    assert!(sink.is_finished());
    Ok(())
}

#[test]
fn raw_stream_into_writer() -> Result<()> {
    let fx = DocFixture::new()?.with_document("log", "boot ok\nready\n")?;
    let mut sink = WriterSink::new(Vec::new(), "response");
    stream_raw(fx.config(), "log", &mut sink)?;
    assert_eq!(sink.into_inner(), b"boot ok\nready\n");
    Ok(())
}

#[test]
fn missing_log_is_not_found() -> Result<()> {
    let fx = DocFixture::new()?;
    let mut sink = MemorySink::new();
    let err = stream_raw(fx.config(), "log", &mut sink).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    assert!(sink.writes().is_empty());
    Ok(())
}

#[test]
fn full_disk_on_drain_fails_the_run() -> Result<()> {
    let fx = DocFixture::new()?.with_document("log", "a line\n")?;
    let mut sink = FailingSink::on_finish(io::ErrorKind::Other);
    let err = stream_raw(fx.config(), "log", &mut sink).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SinkWrite);
    assert_eq!(sink.accepted().text(), "a line\n");
    Ok(())
}

#[test]
fn slow_consumer_bounds_read_ahead() -> Result<()> {
    const CAPACITY: usize = 2;
    const BUFFER: usize = 64;

    let config = StreamConfig {
        channel_capacity: CAPACITY,
        ..StreamConfig::default()
    };
    let fx = DocFixture::new()?.with_config(config.with_buffer_size(BUFFER));
    let body = sample_text(64 * 200);
    let path = fx.write_document("log", &body)?;

    let produced = Arc::new(AtomicUsize::new(0));
    let (mut sink, rx) = ChannelSink::from_config(fx.config());

    let consumer = {
        let produced = Arc::clone(&produced);
        thread::spawn(move || {
            let mut received = 0usize;
            let mut max_ahead = 0usize;
            let mut bytes = Vec::new();
            for chunk in rx {
                received += 1;
                bytes.extend_from_slice(&chunk);
                let ahead = produced.load(Ordering::SeqCst).saturating_sub(received);
                max_ahead = max_ahead.max(ahead);
                if received % 20 == 0 {
                    thread::sleep(Duration::from_millis(2));
                }
            }
            (received, max_ahead, bytes)
        })
    };

    let counted = ChunkSource::new(&path, fx.config().buffer_size).inspect(|_| {
        produced.fetch_add(1, Ordering::SeqCst);
    });
    Pipeline::pass_through().run(counted, &mut sink)?;

    let (received, max_ahead, bytes) = consumer.join().expect("consumer thread");
    assert_eq!(received, 200);
    assert_eq!(bytes, body.as_bytes());
    // channel slots + the chunk blocked in send + the one being read
    assert!(max_ahead <= CAPACITY + 2, "producer ran {max_ahead} chunks ahead");
    Ok(())
}

#[test]
fn dropped_receiver_stops_the_stream_and_releases_the_file() -> Result<()> {
    let fx = DocFixture::new()?;
    let path = fx.write_document("log", &sample_text(64 * 100))?;

    let pulled = Arc::new(AtomicUsize::new(0));
    let (mut sink, rx) = ChannelSink::bounded(1);
    let consumer = thread::spawn(move || {
        let mut it = rx.into_iter();
        let _ = it.next();
        // client goes away after the first chunk
    });

    let counted = {
        let pulled = Arc::clone(&pulled);
        ChunkSource::new(&path, 64).inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        })
    };
    let err = Pipeline::pass_through().run(counted, &mut sink).unwrap_err();
    consumer.join().expect("consumer thread");

    assert!(err.is_disconnect());
    assert!(pulled.load(Ordering::SeqCst) < 100);
    // the source was dropped with the run; the file can be removed right away
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn concurrent_streams_of_one_document_are_independent() -> Result<()> {
    let body = sample_text(30_000);
    let fx = DocFixture::new()?
        .with_config(StreamConfig::default().with_buffer_size(1024))
        .with_document("log", &body)?;

    let (a, b) = thread::scope(|s| {
        let first = s.spawn(|| {
            let mut sink = MemorySink::new();
            stream_raw(fx.config(), "log", &mut sink).map(|summary| (summary, sink))
        });
        let second = s.spawn(|| {
            let mut sink = MemorySink::new();
            stream_raw(fx.config(), "log", &mut sink).map(|summary| (summary, sink))
        });
        (
            first.join().expect("first stream"),
            second.join().expect("second stream"),
        )
    });

    for (summary, sink) in [a?, b?] {
        assert_eq!(sink.text(), body);
        assert_eq!(sink.writes().len(), 30_000usize.div_ceil(1024));
        assert_eq!(summary.bytes_written, 30_000);
    }
    Ok(())
}
