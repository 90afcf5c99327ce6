use super::*;
use crate::test_support::{striped_frames, MemoryDemo, MemorySink};

#[test]
fn fifty_frames_are_flipped_and_kept_in_order() {
    let demo = MemoryDemo::default().with_stream("demo_0", "agentview_rgb", striped_frames(50, 4, 2));
    let mut sink = MemorySink::default();

    let written = replay_episode(&demo, 0, "agentview_rgb", &mut sink).expect("replay");

    assert_eq!(written, 50);
    assert_eq!(sink.frames.len(), 50);
    assert!(sink.finished);
    for (index, frame) in sink.frames.iter().enumerate() {
        let rows: Vec<u8> = frame.chunks_exact(6).map(|row| row[0]).collect();
        let base = (index * 4) as u8;
        assert_eq!(rows, vec![base + 3, base + 2, base + 1, base], "frame {index}");
    }
}

#[test]
fn requested_name_falls_back_to_its_alias() {
    let demo = MemoryDemo::default().with_stream("demo_0", "agentview_image", striped_frames(3, 2, 2));
    let mut sink = MemorySink::default();

    let written = replay_episode(&demo, 0, "agentview_rgb", &mut sink).expect("alias replay");
    assert_eq!(written, 3);

    let episode = DemoEpisode::open(&demo, 0).expect("episode");
    assert_eq!(episode.resolve_stream("agentview_rgb").expect("resolve"), "agentview_image");

    let rgb_only = MemoryDemo::default().with_stream("demo_0", "agentview_rgb", striped_frames(3, 2, 2));
    let mut sink = MemorySink::default();
    assert_eq!(
        replay_episode(&rgb_only, 0, "agentview_image", &mut sink).expect("reverse alias"),
        written
    );
}

#[test]
fn exact_name_wins_over_alias() {
    let demo = MemoryDemo::default()
        .with_stream("demo_0", "agentview_image", striped_frames(2, 2, 2))
        .with_stream("demo_0", "agentview_rgb", striped_frames(5, 2, 2));
    let mut sink = MemorySink::default();

    assert_eq!(replay_episode(&demo, 0, "agentview_rgb", &mut sink).expect("replay"), 5);
}

#[test]
fn missing_stream_names_the_available_ones() {
    let demo = MemoryDemo::default()
        .with_stream("demo_0", "eye_in_hand_rgb", striped_frames(1, 2, 2))
        .with_stream("demo_0", "joint_states", striped_frames(1, 1, 1));
    let mut sink = MemorySink::default();

    let err = replay_episode(&demo, 0, "agentview_rgb", &mut sink).expect_err("no such stream");
    let ReplayError::StreamNotFound {
        episode,
        stream,
        available,
    } = err
    else {
        panic!("expected StreamNotFound, got {err:?}");
    };
    assert_eq!(episode, "demo_0");
    assert_eq!(stream, "agentview_rgb");
    assert_eq!(available, "eye_in_hand_rgb, joint_states");
    assert!(sink.frames.is_empty());
    assert!(!sink.finished);
}

#[test]
fn unaliased_stream_does_not_fall_back() {
    let demo = MemoryDemo::default().with_stream("demo_0", "agentview_rgb", striped_frames(1, 2, 2));
    let mut sink = MemorySink::default();
    let err = replay_episode(&demo, 0, "eye_in_hand_rgb", &mut sink).expect_err("no alias");
    assert!(matches!(err, ReplayError::StreamNotFound { .. }));
}

#[test]
fn missing_episode_is_reported() {
    let demo = MemoryDemo::default().with_stream("demo_0", "agentview_rgb", striped_frames(1, 2, 2));
    let mut sink = MemorySink::default();
    let err = replay_episode(&demo, 7, "agentview_rgb", &mut sink).expect_err("no demo_7");
    assert!(
        matches!(err, ReplayError::EpisodeNotFound { ref episode, ref available } if episode == "demo_7" && available == "demo_0"),
        "{err:?}"
    );
}

#[test]
fn short_episode_replays_what_is_stored() {
    let demo = MemoryDemo::default().with_stream("demo_2", "agentview_rgb", striped_frames(1, 2, 2));
    let mut sink = MemorySink::default();
    assert_eq!(replay_episode(&demo, 2, DEFAULT_STREAM, &mut sink).expect("replay"), 1);
    assert_eq!(sink.shapes, vec![FrameShape { height: 2, width: 2, channels: 3 }]);
}

#[test]
fn nonexistent_file_is_unreadable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent_demo.hdf5");
    let err = replay(&path, 0, DEFAULT_STREAM, &dir.path().join("out.mp4")).expect_err("no file");
    assert!(matches!(err, ReplayError::FileUnreadable { path: ref p, .. } if p == &path));
    assert!(!dir.path().join("out.mp4").exists());
}

#[cfg(not(feature = "hdf5"))]
#[test]
fn existing_file_is_unreadable_without_a_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("task_demo.hdf5");
    std::fs::write(&path, b"not hdf5").expect("write");
    let err = open_demo_file(&path).err().expect("no backend");
    assert!(err.to_string().contains("hdf5"), "{err}");
}

#[cfg(feature = "hdf5")]
#[test]
fn corrupt_file_is_unreadable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("task_demo.hdf5");
    std::fs::write(&path, b"not hdf5").expect("write");
    let err = open_demo_file(&path).err().expect("corrupt file");
    assert!(matches!(err, ReplayError::FileUnreadable { .. }));
}

#[test]
fn flip_reverses_rows_only() {
    let shape = FrameShape {
        height: 2,
        width: 2,
        channels: 2,
    };
    let frame = [1, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(flip_vertical(&frame, shape), vec![5, 6, 7, 8, 1, 2, 3, 4]);
}

#[test]
fn stream_dims_must_match_data() {
    assert!(FrameStream::from_dims(&[2, 2, 2, 3], vec![0; 24]).is_ok());
    assert_eq!(
        FrameStream::from_dims(&[2, 2, 2], vec![0; 8]).expect("gray").shape().channels,
        1
    );
    assert!(FrameStream::from_dims(&[2, 2, 2, 3], vec![0; 23]).is_err());
    assert!(FrameStream::from_dims(&[2, 2], vec![0; 4]).is_err());
    assert!(FrameStream::from_dims(&[0, 0, 0, 3], Vec::new()).is_err());
}

#[test]
fn info_sorts_episodes_numerically_and_counts_frames() {
    let demo = MemoryDemo::default()
        .with_stream("demo_10", "agentview_rgb", striped_frames(4, 2, 2))
        .with_stream("demo_10", "eye_in_hand_rgb", striped_frames(4, 2, 2))
        .with_stream("demo_9", "agentview_image", striped_frames(3, 2, 2))
        .with_stream("demo_2", "joint_states", striped_frames(6, 1, 1));

    let info = dataset_info(&demo).expect("info");

    let ids: Vec<&str> = info.episodes.iter().map(|episode| episode.id.as_str()).collect();
    assert_eq!(ids, vec!["demo_2", "demo_9", "demo_10"]);
    let frames: Vec<usize> = info.episodes.iter().map(|episode| episode.frames).collect();
    assert_eq!(frames, vec![6, 3, 4]);
    assert_eq!(info.total_frames, 13);
    let stats = info.frame_stats.expect("stats");
    assert_eq!((stats.min, stats.max), (3, 6));
    assert!((stats.mean - 13.0 / 3.0).abs() < 1e-9);
    assert_eq!(info.episodes[2].streams, vec!["agentview_rgb", "eye_in_hand_rgb"]);
}

#[test]
fn info_of_empty_container_has_no_stats() {
    let info = dataset_info(&MemoryDemo::default()).expect("info");
    assert!(info.episodes.is_empty());
    assert_eq!(info.total_frames, 0);
    assert_eq!(info.frame_stats, None);
}

#[test]
fn flip_of_a_frame_without_pixels_is_a_no_op() {
    let shape = FrameShape {
        height: 2,
        width: 0,
        channels: 3,
    };
    assert!(flip_vertical(&[], shape).is_empty());
}

#[cfg(unix)]
#[test]
fn fifty_frames_are_encoded_flipped_in_order_at_sixty_fps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = dir.path().join("frames.raw");
    let args = dir.path().join("args.txt");
    let script = format!(
        "cat > '{}'; echo \"$@\" > '{}'",
        raw.display(),
        args.display()
    );
    let mut sink = FfmpegSink::with_command(
        vec!["sh".to_string(), "-c".to_string(), script],
        &dir.path().join("out.mp4"),
        REPLAY_FPS,
    );
    let stream = striped_frames(50, 4, 2);
    let demo = MemoryDemo::default().with_stream("demo_0", "agentview_rgb", stream.clone());

    let written = replay_episode(&demo, 0, "agentview_rgb", &mut sink).expect("replay");

    assert_eq!(written, 50);
    assert_eq!(sink.frames_written(), 50);
    let expected: Vec<u8> = stream
        .frames()
        .flat_map(|frame| flip_vertical(frame, stream.shape()))
        .collect();
    let bytes = std::fs::read(&raw).expect("read piped frames");
    assert_eq!(bytes.len(), 50 * stream.shape().frame_len());
    assert_eq!(bytes, expected);
    assert_eq!(bytes[0], 3, "first piped row is the last stored row of frame 0");
    let args = std::fs::read_to_string(&args).expect("read args");
    assert!(args.contains("-r 60 "), "{args}");
}
