use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 1056,
        height: 384,
        fps: 30,
    }
}

#[test]
fn outputs_are_classified_by_scheme() {
    assert_eq!(
        OutputTarget::classify("out/banner.mp4"),
        OutputTarget::File("out/banner.mp4".into())
    );
    assert_eq!(
        OutputTarget::classify("udp://127.0.0.1:9000"),
        OutputTarget::Stream {
            url: "udp://127.0.0.1:9000".into(),
            format: "mpegts"
        }
    );
    assert!(matches!(
        OutputTarget::classify("RTMP://live/app"),
        OutputTarget::Stream { format: "flv", .. }
    ));
    assert!(!OutputTarget::classify("C:/videos/x.mp4").is_stream());
}

#[test]
fn file_args_end_with_the_path() {
    let args = ffmpeg_args(cfg(), &FfmpegSinkOpts::new("out.mp4"));
    assert_eq!(args.first().map(String::as_str), Some("-y"));
    assert!(args.windows(2).any(|w| w == ["-s", "1056x384"]));
    assert!(args.windows(2).any(|w| w == ["-r", "30"]));
    assert!(args.windows(2).any(|w| w == ["-movflags", "+faststart"]));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn stream_args_use_low_latency_muxing() {
    let mut opts = FfmpegSinkOpts::new("udp://127.0.0.1:9000");
    opts.overwrite = false;
    let args = ffmpeg_args(cfg(), &opts);
    assert_eq!(args.first().map(String::as_str), Some("-n"));
    assert!(args.windows(2).any(|w| w == ["-tune", "zerolatency"]));
    assert!(args.windows(2).any(|w| w == ["-g", "60"]));
    assert!(args.windows(2).any(|w| w == ["-f", "mpegts"]));
    assert!(!args.iter().any(|a| a == "-movflags"));
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn begin_rejects_odd_sizes_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let err = sink
        .begin(SinkConfig {
            width: 1055,
            height: 384,
            fps: 30,
        })
        .unwrap_err();
    assert!(matches!(err, BannerError::Validation(_)));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(0, &frame).is_err());
}
